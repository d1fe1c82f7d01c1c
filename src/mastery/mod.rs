pub mod attempt;
pub mod aggregate;

pub use attempt::{Attempt, Lecture, LecturePerformance, summarize_lecture};
pub use aggregate::{compute_subject_metrics, round_to, MasteryReport, SubjectMetrics};
