use std::panic::{catch_unwind, AssertUnwindSafe};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use crate::error::{EngineError, ValidationError};
use crate::mastery::{compute_subject_metrics, round_to, Lecture, MasteryReport, SubjectMetrics};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectInput {
    #[serde(deserialize_with = "string_or_number")]
    pub subject_id: String,
    #[serde(default)]
    pub subject_name: String,
    #[serde(default)]
    pub lectures: Vec<Lecture>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number, got {}",
            other
        ))),
    }
}

fn id_field(item: &Value, key: &str) -> String {
    match item.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

impl SubjectInput {
    /// Best-effort stand-in for an element that does not deserialize. It
    /// keeps whatever id and name are readable and carries no lectures.
    fn unreadable(item: &Value) -> Self {
        SubjectInput {
            subject_id: id_field(item, "subjectId"),
            subject_name: id_field(item, "subjectName"),
            lectures: Vec::new(),
        }
    }
}

/// One learner's mastery in one subject, rounded for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectCurve {
    pub subject_id: String,
    pub subject_name: String,
    pub kms: f64,
    pub percentage: f64,
    pub metrics: SubjectMetrics,
}

impl SubjectCurve {
    fn zero(subject: &SubjectInput) -> Self {
        SubjectCurve {
            subject_id: subject.subject_id.clone(),
            subject_name: subject.subject_name.clone(),
            kms: 0.0,
            percentage: 0.0,
            metrics: SubjectMetrics::default(),
        }
    }

    fn from_report(subject: &SubjectInput, report: &MasteryReport) -> Self {
        SubjectCurve {
            subject_id: subject.subject_id.clone(),
            subject_name: subject.subject_name.clone(),
            kms: round_to(report.kms, 2),
            percentage: round_to(report.kms * 100.0, 1),
            metrics: report.metrics.rounded(),
        }
    }
}

fn curve_for_subject<F>(subject: &SubjectInput, compute: &F) -> SubjectCurve
where
    F: Fn(&[Lecture]) -> MasteryReport,
{
    if subject.lectures.is_empty() {
        return SubjectCurve::zero(subject);
    }

    match catch_unwind(AssertUnwindSafe(|| compute(&subject.lectures))) {
        Ok(report) if report.kms.is_finite() => SubjectCurve::from_report(subject, &report),
        Ok(report) => {
            tracing::error!(
                subject_id = %subject.subject_id,
                kms = report.kms,
                "Non-finite mastery score, reporting zero"
            );
            SubjectCurve::zero(subject)
        }
        Err(_) => {
            tracing::error!(
                subject_id = %subject.subject_id,
                "Mastery computation panicked, reporting zero"
            );
            SubjectCurve::zero(subject)
        }
    }
}

/// Mastery per subject for one learner, in input order.
pub fn learning_curve_report(
    learner_id: &str,
    subjects: &[SubjectInput],
) -> Result<Vec<SubjectCurve>, EngineError> {
    learning_curve_report_with(learner_id, subjects, compute_subject_metrics)
}

/// Same as [`learning_curve_report`] with the per-subject scoring supplied by
/// the caller. A panic or non-finite score in one subject yields a zero
/// record for that subject only.
pub fn learning_curve_report_with<F>(
    learner_id: &str,
    subjects: &[SubjectInput],
    compute: F,
) -> Result<Vec<SubjectCurve>, EngineError>
where
    F: Fn(&[Lecture]) -> MasteryReport,
{
    if learner_id.trim().is_empty() {
        return Err(ValidationError::MissingLearnerId.into());
    }

    let curves: Vec<SubjectCurve> = subjects
        .iter()
        .map(|subject| curve_for_subject(subject, &compute))
        .collect();

    tracing::info!(
        learner_id = learner_id,
        subjects = curves.len(),
        "Learning curve computed"
    );

    Ok(curves)
}

/// Validate an untyped `{ learnerId, subjects }` request body.
///
/// Only the learner id and the `subjects` array are required. A subject
/// element that does not deserialize is kept as an empty subject, so it
/// reports zero without affecting its neighbours.
pub fn parse_learning_curve_request(
    body: &Value,
) -> Result<(String, Vec<SubjectInput>), ValidationError> {
    let learner_id = match body.get("learnerId") {
        Some(Value::String(id)) if !id.trim().is_empty() => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => return Err(ValidationError::MissingLearnerId),
    };

    let items = match body.get("subjects") {
        None | Some(Value::Null) => return Err(ValidationError::MissingSubjects),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(ValidationError::SubjectsNotArray),
    };

    let subjects = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<SubjectInput>(item.clone()).unwrap_or_else(|e| {
                tracing::warn!(index = index, error = %e, "Unreadable subject, reporting zero");
                SubjectInput::unreadable(item)
            })
        })
        .collect();

    Ok((learner_id, subjects))
}
