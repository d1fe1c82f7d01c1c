use chrono::{DateTime, Duration, TimeZone, Utc};
use kms_engine_lib::mastery::{compute_subject_metrics, summarize_lecture, Attempt, Lecture};

fn at(day: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap() + Duration::days(day)
}

fn lecture(id: &str, scores: &[(f64, i64)]) -> Lecture {
    let attempts = scores
        .iter()
        .map(|&(score, day)| Attempt::new(score, 10.0, at(day)))
        .collect();
    Lecture::new(id, id, attempts)
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_normalize_zero_total_is_zero() {
    assert_eq!(Attempt::new(5.0, 0.0, at(0)).normalized(), 0.0);
    assert_eq!(Attempt::new(5.0, -3.0, at(0)).normalized(), 0.0);
    assert!(approx(Attempt::new(3.0, 4.0, at(0)).normalized(), 0.75));
}

#[test]
fn test_normalize_holds_to_unit_interval() {
    assert_eq!(Attempt::new(15.0, 10.0, at(0)).normalized(), 1.0);
    assert_eq!(Attempt::new(-2.0, 10.0, at(0)).normalized(), 0.0);
    assert_eq!(Attempt::new(f64::NAN, 10.0, at(0)).normalized(), 0.0);
}

#[test]
fn test_unattempted_lecture_has_no_summary() {
    assert!(summarize_lecture(&lecture("empty", &[])).is_none());
}

#[test]
fn test_summary_sorts_by_time() {
    // Supplied out of order; chronological scores are 0.5, 0.7, 0.9
    let lec = lecture("l1", &[(9.0, 3), (5.0, 1), (7.0, 2)]);
    let perf = summarize_lecture(&lec).unwrap();
    assert!(approx(perf.average_normalized_score, 0.7));
    assert!(approx(perf.trend, 0.4));
}

#[test]
fn test_summary_uses_last_three_attempts() {
    let lec = lecture("l1", &[(1.0, 0), (5.0, 1), (7.0, 2), (9.0, 3)]);
    let perf = summarize_lecture(&lec).unwrap();
    assert!(approx(perf.average_normalized_score, 0.7));
    assert!(approx(perf.trend, 0.4));
}

#[test]
fn test_single_attempt_has_flat_trend() {
    let perf = summarize_lecture(&lecture("l1", &[(6.0, 0)])).unwrap();
    assert!(approx(perf.average_normalized_score, 0.6));
    assert_eq!(perf.trend, 0.0);
}

#[test]
fn test_equal_timestamps_keep_input_order() {
    let lec = lecture("l1", &[(2.0, 0), (8.0, 0)]);
    let perf = summarize_lecture(&lec).unwrap();
    assert!(approx(perf.trend, 0.6));

    let reversed = lecture("l1", &[(8.0, 0), (2.0, 0)]);
    let perf = summarize_lecture(&reversed).unwrap();
    assert!(approx(perf.trend, -0.6));
}

#[test]
fn test_single_lecture_subject_scenario() {
    let report = compute_subject_metrics(&[lecture("l1", &[(5.0, 1), (7.0, 2), (9.0, 3)])]);
    assert!(approx(report.metrics.avg_score, 0.7));
    assert!(approx(report.metrics.trend, 0.4));
    assert_eq!(report.metrics.consistency, 1.0);
    assert_eq!(report.metrics.coverage, 1.0);
    assert!(approx(report.kms, 0.715));
}

#[test]
fn test_unattempted_lecture_only_lowers_coverage() {
    let report = compute_subject_metrics(&[
        lecture("l1", &[(5.0, 1), (7.0, 2), (9.0, 3)]),
        lecture("l2", &[]),
    ]);
    assert!(approx(report.metrics.avg_score, 0.7));
    assert!(approx(report.metrics.trend, 0.4));
    assert_eq!(report.metrics.consistency, 1.0);
    assert!(approx(report.metrics.coverage, 0.5));
    assert!(approx(report.kms, 0.665));
}

#[test]
fn test_no_lectures_is_all_zero() {
    let report = compute_subject_metrics(&[]);
    assert_eq!(report.kms, 0.0);
    assert_eq!(report.metrics.avg_score, 0.0);
    assert_eq!(report.metrics.trend, 0.0);
    assert_eq!(report.metrics.consistency, 0.0);
    assert_eq!(report.metrics.coverage, 0.0);
}

#[test]
fn test_all_unattempted_is_all_zero() {
    let report = compute_subject_metrics(&[lecture("l1", &[]), lecture("l2", &[])]);
    assert_eq!(report.kms, 0.0);
    assert_eq!(report.metrics.consistency, 0.0);
    assert_eq!(report.metrics.coverage, 0.0);
}

#[test]
fn test_consistency_uses_population_variance() {
    // Lecture averages 0.2 and 0.8: mean 0.5, variance 0.09
    let report = compute_subject_metrics(&[lecture("l1", &[(2.0, 0)]), lecture("l2", &[(8.0, 0)])]);
    assert!(approx(report.metrics.avg_score, 0.5));
    assert!(approx(report.metrics.consistency, 1.0 / 1.09));
    assert!(report.metrics.consistency < 1.0);
}

#[test]
fn test_negative_trend_does_not_reduce_kms() {
    let report = compute_subject_metrics(&[lecture("l1", &[(9.0, 0), (5.0, 1)])]);
    assert!(approx(report.metrics.trend, -0.4));
    assert!(approx(report.kms, 0.45 * 0.7 + 0.2 + 0.1));
}

#[test]
fn test_kms_and_submetrics_stay_in_range() {
    let shapes: Vec<Vec<Lecture>> = vec![
        vec![lecture("a", &[(10.0, 0), (10.0, 1), (10.0, 2)])],
        vec![lecture("a", &[(0.0, 0)]), lecture("b", &[(10.0, 0)]), lecture("c", &[])],
        vec![lecture("a", &[(0.0, 0), (10.0, 1)]), lecture("b", &[(0.0, 0), (10.0, 1)])],
        vec![lecture("a", &[(20.0, 0), (-5.0, 1)])],
        vec![lecture("a", &[]), lecture("b", &[(3.0, 4), (1.0, 2), (9.0, 9), (0.0, 1)])],
    ];

    for lectures in shapes {
        let report = compute_subject_metrics(&lectures);
        assert!((0.0..=1.0).contains(&report.kms), "kms out of range: {}", report.kms);
        assert!((0.0..=1.0).contains(&report.metrics.avg_score));
        assert!((-1.0..=1.0).contains(&report.metrics.trend));
        assert!(report.metrics.consistency > 0.0 && report.metrics.consistency <= 1.0);
        assert!((0.0..=1.0).contains(&report.metrics.coverage));
    }
}
