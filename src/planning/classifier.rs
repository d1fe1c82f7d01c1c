use serde::{Serialize, Deserialize};
use crate::mastery::round_to;

pub const MODERATE_THRESHOLD: f64 = 0.4;
pub const STABLE_THRESHOLD: f64 = 0.7;

/// How weak a learner is in a subject. `Strong` means strongly weak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaknessLevel {
    Strong,
    Moderate,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanType {
    Remedial,
    Reinforcement,
    #[serde(rename = "Exam Polishing")]
    ExamPolishing,
}

impl PlanType {
    pub fn label(&self) -> &'static str {
        match self {
            PlanType::Remedial => "Remedial",
            PlanType::Reinforcement => "Reinforcement",
            PlanType::ExamPolishing => "Exam Polishing",
        }
    }

    pub fn strategy(&self) -> &'static str {
        match self {
            PlanType::Remedial => {
                "Rebuild fundamentals: revisit core lecture notes and re-attempt the basic quizzes before moving on."
            }
            PlanType::Reinforcement => {
                "Mixed practice: interleave topics and target the weak areas with focused quizzes."
            }
            PlanType::ExamPolishing => {
                "Exam polishing: sit timed mock tests and work through past papers."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanClassification {
    pub plan_type: PlanType,
    pub strategy: String,
    pub confidence: f64,
}

/// Tier a KMS value. Each threshold belongs to the tier above it:
/// below 0.4 is `Strong`, below 0.7 is `Moderate`, otherwise `Stable`.
pub fn weakness_level(kms: f64) -> WeaknessLevel {
    if kms < MODERATE_THRESHOLD {
        WeaknessLevel::Strong
    } else if kms < STABLE_THRESHOLD {
        WeaknessLevel::Moderate
    } else {
        WeaknessLevel::Stable
    }
}

pub fn plan_type_for(level: WeaknessLevel) -> PlanType {
    match level {
        WeaknessLevel::Strong => PlanType::Remedial,
        WeaknessLevel::Moderate => PlanType::Reinforcement,
        WeaknessLevel::Stable => PlanType::ExamPolishing,
    }
}

/// Plan view of the same threshold split.
pub fn classify(kms: f64) -> PlanClassification {
    let plan_type = plan_type_for(weakness_level(kms));
    PlanClassification {
        plan_type,
        strategy: plan_type.strategy().to_string(),
        confidence: round_to(kms, 2),
    }
}
