use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Number of most recent attempts that count toward a lecture's score.
pub const RECENT_WINDOW: usize = 3;

/// One scored quiz attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    #[serde(default, deserialize_with = "null_as_zero")]
    pub score: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub total: f64,
    pub occurred_at: DateTime<Utc>,
}

// A missing or null score/total is an unscored attempt, not a malformed one.
fn null_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

impl Attempt {
    pub fn new(score: f64, total: f64, occurred_at: DateTime<Utc>) -> Self {
        Attempt { score, total, occurred_at }
    }

    /// `score / total` held to [0, 1], or 0 when the maximum is not positive.
    pub fn normalized(&self) -> f64 {
        if !(self.total > 0.0) {
            return 0.0;
        }
        let ratio = self.score / self.total;
        if ratio.is_finite() {
            ratio.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lecture {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub attempts: Vec<Attempt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

impl Lecture {
    pub fn new<S: Into<String>>(id: S, title: S, attempts: Vec<Attempt>) -> Self {
        Lecture {
            id: id.into(),
            title: title.into(),
            attempts,
            transcript: None,
        }
    }

    pub fn is_attempted(&self) -> bool {
        !self.attempts.is_empty()
    }
}

/// Recent-window summary of one attempted lecture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LecturePerformance {
    pub average_normalized_score: f64,
    pub trend: f64,
}

/// Summarize a lecture over its last three attempts by time.
///
/// Returns `None` for an unattempted lecture: such lectures are left out of
/// the subject aggregate rather than scored as zero. Attempts sharing a
/// timestamp keep their input order.
pub fn summarize_lecture(lecture: &Lecture) -> Option<LecturePerformance> {
    if lecture.attempts.is_empty() {
        return None;
    }

    let mut ordered: Vec<&Attempt> = lecture.attempts.iter().collect();
    ordered.sort_by_key(|a| a.occurred_at);

    let start = ordered.len().saturating_sub(RECENT_WINDOW);
    let window: Vec<f64> = ordered[start..].iter().map(|a| a.normalized()).collect();

    let average = window.iter().sum::<f64>() / window.len() as f64;
    let trend = match (window.first(), window.last()) {
        (Some(first), Some(last)) if window.len() >= 2 => last - first,
        _ => 0.0,
    };

    tracing::debug!(
        lecture_id = %lecture.id,
        window = window.len(),
        average = average,
        trend = trend,
        "Lecture summarized"
    );

    Some(LecturePerformance {
        average_normalized_score: average,
        trend,
    })
}
