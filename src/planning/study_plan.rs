use serde::{Serialize, Deserialize};
use crate::mastery::SubjectMetrics;
use crate::pipelines::generator::TextGenerator;
use crate::planning::classifier::{classify, WeaknessLevel};
use crate::planning::{PlanOutcome, Planner};

/// Fixed length of the template plan, whatever the days remaining.
pub const FALLBACK_PLAN_DAYS: usize = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyPlanDay {
    pub day: u32,
    pub focus: String,
    #[serde(default)]
    pub tasks: Vec<String>,
}

pub fn build_prompt(
    kms: f64,
    metrics: &SubjectMetrics,
    weakness: WeaknessLevel,
    days_remaining: u32,
) -> String {
    format!(
        r#"You are a study coach. Build a day-by-day study plan for a learner.

Learner profile:
- Knowledge mastery score (0 to 1): {kms:.2}
- Average recent score: {avg:.2}
- Score trend: {trend:.2}
- Consistency across lectures: {consistency:.2}
- Lecture coverage: {coverage:.2}
- Weakness level: {weakness:?}

The exam is in exactly {days_remaining} day(s). Produce exactly {days_remaining} entries, one per day, numbered from 1.

Return ONLY valid JSON in the following schema:

{{
  "plan": [
    {{ "day": 1, "focus": "short focus for the day", "tasks": ["task one", "task two"] }}
  ]
}}

Output only valid JSON, no markdown or extra text."#,
        kms = kms,
        avg = metrics.avg_score,
        trend = metrics.trend,
        consistency = metrics.consistency,
        coverage = metrics.coverage,
        weakness = weakness,
        days_remaining = days_remaining,
    )
}

/// Seven-day template keyed on the classifier's plan. Day 1 carries the
/// strategy; the rest is a fixed progression.
pub fn fallback_study_plan(kms: f64) -> Vec<StudyPlanDay> {
    let classification = classify(kms);

    let progression: [(&str, [&str; 2]); FALLBACK_PLAN_DAYS - 1] = [
        ("Mixed Practice", ["Attempt a mixed quiz across all lectures", "Note every question you got wrong"]),
        ("Application", ["Solve applied problems for each topic", "Explain one solution aloud in your own words"]),
        ("Revision", ["Re-read summaries of the weakest lectures", "Rewrite key definitions from memory"]),
        ("Mock Test", ["Take a full timed mock test", "Mark it and list the gaps it exposed"]),
        ("Deep Dive", ["Study the two weakest topics in depth", "Re-attempt their quizzes"]),
        ("Final Review", ["Skim all notes and formula sheets", "Rest and plan the exam day"]),
    ];

    let mut plan = Vec::with_capacity(FALLBACK_PLAN_DAYS);
    plan.push(StudyPlanDay {
        day: 1,
        focus: classification.plan_type.label().to_string(),
        tasks: vec![
            classification.strategy.clone(),
            "Review the lecture notes for the lowest-scoring lecture".to_string(),
        ],
    });
    for (offset, (focus, tasks)) in progression.iter().enumerate() {
        plan.push(StudyPlanDay {
            day: offset as u32 + 2,
            focus: focus.to_string(),
            tasks: tasks.iter().map(|t| t.to_string()).collect(),
        });
    }
    plan
}

fn validate_days(days: &[StudyPlanDay]) -> Result<(), String> {
    if days.is_empty() {
        return Err("Generated plan is empty".to_string());
    }
    if let Some(bad) = days.iter().find(|d| d.day == 0 || d.focus.trim().is_empty()) {
        return Err(format!("Generated plan has an invalid entry for day {}", bad.day));
    }
    Ok(())
}

/// Ask the planner for a day-by-day plan, falling back to the 7-day template.
pub async fn build_study_plan<G: TextGenerator>(
    planner: &Planner<G>,
    kms: f64,
    metrics: &SubjectMetrics,
    weakness: WeaknessLevel,
    days_remaining: u32,
) -> PlanOutcome<Vec<StudyPlanDay>> {
    let days_remaining = days_remaining.max(1);
    let prompt = build_prompt(kms, metrics, weakness, days_remaining);

    let result = planner
        .request_list::<StudyPlanDay, _>("study_plan", &prompt, "plan", validate_days)
        .await;

    if let Ok(days) = &result {
        if days.len() != days_remaining as usize {
            tracing::warn!(
                requested = days_remaining,
                received = days.len(),
                "Generated plan length differs from days remaining"
            );
        }
    }

    planner.settle("study_plan", result, || fallback_study_plan(kms))
}
