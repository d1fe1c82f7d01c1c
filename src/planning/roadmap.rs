use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use crate::mastery::Lecture;
use crate::pipelines::generator::TextGenerator;
use crate::planning::{PlanOutcome, Planner};

pub const FALLBACK_ROADMAP_PHASES: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapPhase {
    pub phase_name: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub focus: String,
    #[serde(default)]
    pub tasks: Vec<String>,
}

/// Topic strings for the roadmap prompt: each title, followed by the first
/// `prefix_chars` characters of its transcript when there is one.
pub fn topics_from_lectures(lectures: &[Lecture], prefix_chars: usize) -> Vec<String> {
    lectures
        .iter()
        .map(|lecture| {
            let excerpt: String = lecture
                .transcript
                .as_deref()
                .map(|t| t.trim().chars().take(prefix_chars).collect())
                .unwrap_or_default();
            if excerpt.is_empty() {
                lecture.title.clone()
            } else {
                format!("{}: {}", lecture.title, excerpt)
            }
        })
        .collect()
}

pub fn build_prompt(subject_name: &str, exam_date: Option<DateTime<Utc>>, topics: &[String]) -> String {
    let exam_line = match exam_date {
        Some(date) => format!("The exam is on {}.", date.format("%Y-%m-%d")),
        None => "No exam date is set.".to_string(),
    };
    let topic_lines = if topics.is_empty() {
        "- (no lecture topics available)".to_string()
    } else {
        topics.iter().map(|t| format!("- {}", t)).collect::<Vec<_>>().join("\n")
    };

    format!(
        r#"You are a study coach. Create a learning roadmap for the subject "{subject_name}".
{exam_line}

Lecture topics, in course order:
{topic_lines}

Split the roadmap into 4 or 5 phases moving from foundations, to advanced material, to revision.

Return ONLY valid JSON in the following schema:

{{
  "roadmap": [
    {{ "phaseName": "Phase name", "duration": "e.g. Week 1", "focus": "what this phase covers", "tasks": ["task one", "task two"] }}
  ]
}}

Output only valid JSON, no markdown or extra text."#
    )
}

/// Four generic phases named after the subject. Ignores the learner's topics.
pub fn fallback_roadmap(subject_name: &str) -> Vec<RoadmapPhase> {
    let phase = |name: &str, duration: &str, focus: String, tasks: [String; 2]| RoadmapPhase {
        phase_name: name.to_string(),
        duration: duration.to_string(),
        focus,
        tasks: tasks.to_vec(),
    };

    vec![
        phase(
            "Fundamentals",
            "Week 1",
            format!("Core definitions and basic principles of {}", subject_name),
            [
                format!("Read the introductory lectures of {}", subject_name),
                "Summarize each key concept in one sentence".to_string(),
            ],
        ),
        phase(
            "Core Concepts",
            "Week 2",
            format!("Central theories and methods in {}", subject_name),
            [
                "Work through the main lecture examples".to_string(),
                "Attempt the quizzes for each core topic".to_string(),
            ],
        ),
        phase(
            "Application",
            "Week 3",
            format!("Applying {} to problems", subject_name),
            [
                "Solve practice problems of increasing difficulty".to_string(),
                "Review mistakes and redo the failed problems".to_string(),
            ],
        ),
        phase(
            "Final Revision",
            "Week 4",
            format!("Consolidating {} for the exam", subject_name),
            [
                "Take a timed mock exam".to_string(),
                "Revise weak areas and key formulas".to_string(),
            ],
        ),
    ]
}

fn validate_phases(phases: &[RoadmapPhase]) -> Result<(), String> {
    if phases.is_empty() {
        return Err("Generated roadmap is empty".to_string());
    }
    if phases.iter().any(|p| p.phase_name.trim().is_empty()) {
        return Err("Generated roadmap has a phase without a name".to_string());
    }
    Ok(())
}

/// Ask the planner for a phased roadmap, falling back to the 4-phase template.
pub async fn build_roadmap<G: TextGenerator>(
    planner: &Planner<G>,
    subject_name: &str,
    exam_date: Option<DateTime<Utc>>,
    topics: &[String],
) -> PlanOutcome<Vec<RoadmapPhase>> {
    let prompt = build_prompt(subject_name, exam_date, topics);

    let result = planner
        .request_list::<RoadmapPhase, _>("roadmap", &prompt, "roadmap", validate_phases)
        .await;

    planner.settle("roadmap", result, || fallback_roadmap(subject_name))
}
