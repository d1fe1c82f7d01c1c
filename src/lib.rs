pub mod routes;
pub mod pipelines;
pub mod mastery;
pub mod planning;
pub mod analytics;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{EngineError, ValidationError};
pub use mastery::{Attempt, Lecture, MasteryReport, SubjectMetrics};
pub use planning::{PlanOutcome, Planner};

/// Set up logging and load configuration. Call once at process start.
pub fn init() -> &'static config::engine::EngineConfig {
    logging::init_logging();
    let config = config::engine::get_engine_config();
    tracing::info!(
        model = %config.planner_model,
        timeout_secs = config.request_timeout_secs,
        reference_today = ?config.reference_today,
        "kms engine starting"
    );
    config
}
