use serde_json::json;
use kms_engine_lib::analytics::{learning_curve_report, learning_curve_report_with, SubjectInput};
use kms_engine_lib::mastery::{compute_subject_metrics, Lecture, MasteryReport, SubjectMetrics};
use kms_engine_lib::routes::learning_curve;

fn attempts(scores: &[f64]) -> serde_json::Value {
    let list: Vec<serde_json::Value> = scores
        .iter()
        .enumerate()
        .map(|(i, s)| json!({
            "score": s,
            "total": 10,
            "occurredAt": format!("2024-02-0{}T10:00:00Z", i + 1),
        }))
        .collect();
    json!(list)
}

#[test]
fn test_report_per_subject_in_order() {
    let body = json!({
        "learnerId": "learner-1",
        "subjects": [
            {
                "subjectId": "math",
                "subjectName": "Mathematics",
                "lectures": [
                    { "id": "m1", "title": "Limits", "attempts": attempts(&[5.0, 7.0, 9.0]) },
                    { "id": "m2", "title": "Series", "attempts": [] }
                ]
            },
            { "subjectId": "bio", "subjectName": "Biology", "lectures": [] }
        ]
    });

    let report = learning_curve(&body).unwrap();
    assert_eq!(report.len(), 2);

    let math = &report[0];
    assert_eq!(math.subject_id, "math");
    assert_eq!(math.kms, 0.67);
    assert_eq!(math.percentage, 66.5);
    assert_eq!(math.metrics.avg_score, 0.7);
    assert_eq!(math.metrics.trend, 0.4);
    assert_eq!(math.metrics.consistency, 1.0);
    assert_eq!(math.metrics.coverage, 0.5);

    let bio = &report[1];
    assert_eq!(bio.subject_id, "bio");
    assert_eq!(bio.kms, 0.0);
    assert_eq!(bio.percentage, 0.0);
    assert_eq!(bio.metrics.consistency, 0.0);
}

#[test]
fn test_empty_subject_list_is_empty_report() {
    let report = learning_curve(&json!({ "learnerId": "learner-1", "subjects": [] })).unwrap();
    assert!(report.is_empty());
}

#[test]
fn test_missing_learner_is_rejected() {
    let err = learning_curve(&json!({ "subjects": [] })).unwrap_err();
    assert!(err.is_validation());
    assert!(err.message.contains("learnerId"));

    let err = learning_curve(&json!({ "learnerId": "  ", "subjects": [] })).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_subjects_must_be_an_array() {
    let err = learning_curve(&json!({ "learnerId": "learner-1" })).unwrap_err();
    assert!(err.is_validation());

    let err = learning_curve(&json!({ "learnerId": "learner-1", "subjects": { "subjectId": "x" } })).unwrap_err();
    assert!(err.is_validation());
    assert!(err.message.contains("array"));
}

#[test]
fn test_unreadable_subject_reports_zero_alone() {
    let body = json!({
        "learnerId": "learner-1",
        "subjects": [
            { "subjectId": "ok", "lectures": [{ "id": "m1", "title": "Limits", "attempts": attempts(&[5.0, 7.0, 9.0]) }] },
            { "subjectId": "broken", "subjectName": "Broken", "lectures": "nope" }
        ]
    });

    let report = learning_curve(&body).unwrap();
    assert_eq!(report.len(), 2);
    assert_eq!(report[0].subject_id, "ok");
    assert!(report[0].kms > 0.0);
    assert_eq!(report[1].subject_id, "broken");
    assert_eq!(report[1].subject_name, "Broken");
    assert_eq!(report[1].kms, 0.0);
    assert_eq!(report[1].metrics, SubjectMetrics::default());
}

#[test]
fn test_null_or_missing_total_scores_zero() {
    let body = json!({
        "learnerId": "l1",
        "subjects": [
            {
                "subjectId": "a",
                "lectures": [{ "id": "x", "title": "t", "attempts": [
                    { "score": 3, "total": null, "occurredAt": "2024-01-01T00:00:00Z" }
                ]}]
            },
            {
                "subjectId": "b",
                "lectures": [{ "id": "y", "title": "u", "attempts": [
                    { "score": 3, "occurredAt": "2024-01-01T00:00:00Z" }
                ]}]
            },
            { "subjectId": "c", "lectures": [] }
        ]
    });

    let report = learning_curve(&body).unwrap();
    assert_eq!(report.len(), 3);
    for curve in &report[..2] {
        assert_eq!(curve.metrics.avg_score, 0.0);
        assert_eq!(curve.metrics.consistency, 1.0);
        assert_eq!(curve.metrics.coverage, 1.0);
        assert_eq!(curve.kms, 0.3);
        assert_eq!(curve.percentage, 30.0);
    }
    assert_eq!(report[2].subject_id, "c");
    assert_eq!(report[2].kms, 0.0);
}

#[test]
fn test_numeric_subject_id_is_accepted() {
    let body = json!({
        "learnerId": "l1",
        "subjects": [{ "subjectId": "a", "lectures": [] }, { "subjectId": 7, "lectures": [] }]
    });

    let report = learning_curve(&body).unwrap();
    assert_eq!(report.len(), 2);
    assert_eq!(report[1].subject_id, "7");
}

fn lecture_subject(id: &str, lecture_id: &str) -> SubjectInput {
    let lectures: Vec<Lecture> = serde_json::from_value(json!([
        { "id": lecture_id, "title": "Topic", "attempts": attempts(&[4.0, 8.0]) }
    ]))
    .unwrap();
    SubjectInput {
        subject_id: id.to_string(),
        subject_name: id.to_uppercase(),
        lectures,
    }
}

#[test]
fn test_failing_subject_does_not_affect_neighbours() {
    let subjects = vec![
        lecture_subject("first", "l1"),
        lecture_subject("panics", "boom"),
        lecture_subject("nan", "nan"),
        lecture_subject("last", "l4"),
    ];

    let report = learning_curve_report_with("learner-1", &subjects, |lectures: &[Lecture]| {
        match lectures[0].id.as_str() {
            "boom" => panic!("scoring failed"),
            "nan" => MasteryReport { kms: f64::NAN, metrics: SubjectMetrics::default() },
            _ => compute_subject_metrics(lectures),
        }
    })
    .unwrap();

    let expected = learning_curve_report("learner-1", &[subjects[0].clone(), subjects[3].clone()]).unwrap();

    assert_eq!(report.len(), 4);
    assert_eq!(report[0], expected[0]);
    assert_eq!(report[3], expected[1]);
    for zeroed in &report[1..3] {
        assert_eq!(zeroed.kms, 0.0);
        assert_eq!(zeroed.percentage, 0.0);
        assert_eq!(zeroed.metrics, SubjectMetrics::default());
    }
    assert_eq!(report[1].subject_id, "panics");
    assert_eq!(report[2].subject_name, "NAN");
}

#[test]
fn test_typed_report_requires_learner() {
    let subjects = vec![SubjectInput {
        subject_id: "s1".to_string(),
        subject_name: "Art".to_string(),
        lectures: vec![],
    }];

    assert!(learning_curve_report("", &subjects).unwrap_err().is_validation());
    let report = learning_curve_report("learner-9", &subjects).unwrap();
    assert_eq!(report.len(), 1);
    assert_eq!(report[0].percentage, 0.0);
}

#[test]
fn test_numeric_learner_id_is_accepted() {
    let report = learning_curve(&json!({ "learnerId": 42, "subjects": [] })).unwrap();
    assert!(report.is_empty());
}
