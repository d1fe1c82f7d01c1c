use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use serde_json::Value;
use crate::analytics::{self, SubjectCurve};
use crate::config::engine::EngineConfig;
use crate::error::EngineError;
use crate::mastery::{self, Lecture, MasteryReport, SubjectMetrics};
use crate::pipelines::generator::TextGenerator;
use crate::planning::classifier::{self, PlanClassification, WeaknessLevel};
use crate::planning::roadmap::{self, RoadmapPhase};
use crate::planning::study_plan::{self, StudyPlanDay};
use crate::planning::{days_remaining, PlanOutcome, Planner};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlanRequest {
    pub kms: f64,
    pub metrics: SubjectMetrics,
    pub weakness_level: WeaknessLevel,
    pub days_remaining: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapRequest {
    pub subject_name: String,
    #[serde(default)]
    pub exam_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub topics: Vec<String>,
}

/// Everything produced for one subject's study plan request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectPlan {
    pub kms: f64,
    pub metrics: SubjectMetrics,
    pub weakness_level: WeaknessLevel,
    pub classification: PlanClassification,
    pub days_remaining: u32,
    pub plan: PlanOutcome<Vec<StudyPlanDay>>,
}

pub fn compute_subject_metrics(lectures: &[Lecture]) -> MasteryReport {
    mastery::compute_subject_metrics(lectures)
}

pub fn classify_weakness(kms: f64) -> WeaknessLevel {
    classifier::weakness_level(kms)
}

pub fn classify_plan(kms: f64) -> PlanClassification {
    classifier::classify(kms)
}

pub async fn build_study_plan<G: TextGenerator>(
    planner: &Planner<G>,
    request: &StudyPlanRequest,
) -> PlanOutcome<Vec<StudyPlanDay>> {
    study_plan::build_study_plan(
        planner,
        request.kms,
        &request.metrics,
        request.weakness_level,
        request.days_remaining,
    )
    .await
}

pub async fn build_roadmap<G: TextGenerator>(
    planner: &Planner<G>,
    request: &RoadmapRequest,
) -> PlanOutcome<Vec<RoadmapPhase>> {
    roadmap::build_roadmap(planner, &request.subject_name, request.exam_date, &request.topics).await
}

/// Score a subject, classify it and plan until the exam.
pub async fn study_plan_for_subject<G: TextGenerator>(
    planner: &Planner<G>,
    config: &EngineConfig,
    lectures: &[Lecture],
    exam_date: Option<DateTime<Utc>>,
) -> SubjectPlan {
    let report = mastery::compute_subject_metrics(lectures);
    let weakness_level = classifier::weakness_level(report.kms);
    let classification = classifier::classify(report.kms);
    let days = days_remaining(exam_date, config.reference_instant(), config.default_days_remaining);

    tracing::info!(
        kms = report.kms,
        weakness = ?weakness_level,
        days_remaining = days,
        "Building study plan"
    );

    let plan = study_plan::build_study_plan(planner, report.kms, &report.metrics, weakness_level, days).await;

    SubjectPlan {
        kms: report.kms,
        metrics: report.metrics,
        weakness_level,
        classification,
        days_remaining: days,
        plan,
    }
}

/// Roadmap for a subject, deriving topics from its lectures.
pub async fn roadmap_for_subject<G: TextGenerator>(
    planner: &Planner<G>,
    config: &EngineConfig,
    subject_name: &str,
    exam_date: Option<DateTime<Utc>>,
    lectures: &[Lecture],
) -> PlanOutcome<Vec<RoadmapPhase>> {
    let topics = roadmap::topics_from_lectures(lectures, config.topic_transcript_chars);
    roadmap::build_roadmap(planner, subject_name, exam_date, &topics).await
}

/// Batch endpoint: validates `{ learnerId, subjects }` before computing.
pub fn learning_curve(body: &Value) -> Result<Vec<SubjectCurve>, EngineError> {
    let (learner_id, subjects) = analytics::parse_learning_curve_request(body)
        .map_err(|e| {
            tracing::warn!(error = %e, "Rejected learning curve request");
            EngineError::from(e)
        })?;
    analytics::learning_curve_report(&learner_id, &subjects)
}
