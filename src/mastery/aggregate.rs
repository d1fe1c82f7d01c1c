use serde::{Serialize, Deserialize};
use crate::mastery::attempt::{summarize_lecture, Lecture, LecturePerformance};

pub const WEIGHT_AVG_SCORE: f64 = 0.45;
pub const WEIGHT_TREND: f64 = 0.25;
pub const WEIGHT_CONSISTENCY: f64 = 0.2;
pub const WEIGHT_COVERAGE: f64 = 0.1;

/// Sub-metrics behind a subject's KMS.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectMetrics {
    pub avg_score: f64,
    /// Mean per-lecture trend; may be negative, only its positive part feeds KMS
    pub trend: f64,
    pub consistency: f64,
    pub coverage: f64,
}

impl SubjectMetrics {
    pub fn rounded(&self) -> SubjectMetrics {
        SubjectMetrics {
            avg_score: round_to(self.avg_score, 2),
            trend: round_to(self.trend, 2),
            consistency: round_to(self.consistency, 2),
            coverage: round_to(self.coverage, 2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryReport {
    pub kms: f64,
    pub metrics: SubjectMetrics,
}

impl MasteryReport {
    /// Result for a subject with no scored work at all.
    pub fn zero() -> Self {
        MasteryReport::default()
    }
}

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance; zero for fewer than two values.
fn population_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

/// Weighted composite of the four sub-metrics. Trend only counts when positive.
pub fn kms_from_metrics(metrics: &SubjectMetrics) -> f64 {
    WEIGHT_AVG_SCORE * metrics.avg_score
        + WEIGHT_TREND * metrics.trend.max(0.0)
        + WEIGHT_CONSISTENCY * metrics.consistency
        + WEIGHT_COVERAGE * metrics.coverage
}

/// Compute the Knowledge Mastery Score and its sub-metrics for one subject.
///
/// Unattempted lectures only affect coverage. A subject with no lectures, or
/// none attempted, reports zero for KMS and every sub-metric.
pub fn compute_subject_metrics(lectures: &[Lecture]) -> MasteryReport {
    let total_count = lectures.len();
    let performances: Vec<LecturePerformance> = lectures
        .iter()
        .filter_map(summarize_lecture)
        .collect();
    let attempted_count = performances.len();

    if attempted_count == 0 {
        tracing::debug!(lectures = total_count, "No attempted lectures, zero mastery");
        return MasteryReport::zero();
    }

    let averages: Vec<f64> = performances.iter().map(|p| p.average_normalized_score).collect();
    let trends: Vec<f64> = performances.iter().map(|p| p.trend).collect();

    let variance = population_variance(&averages);
    let metrics = SubjectMetrics {
        avg_score: mean(&averages),
        trend: mean(&trends),
        consistency: 1.0 / (1.0 + variance),
        coverage: attempted_count as f64 / total_count as f64,
    };
    let kms = kms_from_metrics(&metrics);

    tracing::debug!(
        attempted = attempted_count,
        lectures = total_count,
        variance = variance,
        kms = kms,
        "Subject mastery computed"
    );

    MasteryReport { kms, metrics }
}
