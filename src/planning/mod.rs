pub mod classifier;
pub mod roadmap;
pub mod study_plan;

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::{Duration, Instant};
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize, de::DeserializeOwned};
use crate::config::engine::EngineConfig;
use crate::error::EngineError;
use crate::logging::{log_fallback, log_model_call};
use crate::metrics::Metrics;
use crate::pipelines::generator::TextGenerator;
use crate::pipelines::json_extract::parse_wrapped_list;

const MS_PER_DAY: i64 = 86_400_000;

/// Which path produced a plan or roadmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "payload", rename_all = "lowercase")]
pub enum PlanOutcome<T> {
    Generated(T),
    Fallback(T),
}

impl<T> PlanOutcome<T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, PlanOutcome::Fallback(_))
    }

    pub fn payload(&self) -> &T {
        match self {
            PlanOutcome::Generated(p) | PlanOutcome::Fallback(p) => p,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            PlanOutcome::Generated(p) | PlanOutcome::Fallback(p) => p,
        }
    }
}

/// Whole days from `reference` until the exam, rounded up and never below 1.
/// Without an exam date the configured default applies.
pub fn days_remaining(
    exam_date: Option<DateTime<Utc>>,
    reference: DateTime<Utc>,
    default_days: u32,
) -> u32 {
    let Some(exam) = exam_date else {
        return default_days.max(1);
    };

    let ms = (exam - reference).num_milliseconds();
    let mut days = ms.div_euclid(MS_PER_DAY);
    if ms.rem_euclid(MS_PER_DAY) > 0 {
        days += 1;
    }

    days.clamp(1, u32::MAX as i64) as u32
}

/// Runs single-shot generation requests and settles them into a
/// `PlanOutcome`. No retries: one failed or slow call means fallback.
pub struct Planner<G: TextGenerator> {
    generator: G,
    timeout: Duration,
    metrics: Metrics,
}

impl<G: TextGenerator> Planner<G> {
    pub fn new(generator: G, timeout: Duration) -> Self {
        Planner {
            generator,
            timeout,
            metrics: Metrics::new(),
        }
    }

    pub fn from_config(generator: G, config: &EngineConfig) -> Self {
        Self::new(generator, config.request_timeout())
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// One generation call parsed into a list of `T`.
    ///
    /// Timeouts, transport errors, unparseable text, a panicking parser and
    /// entries rejected by `validate` all come back as `Err`.
    pub(crate) async fn request_list<T, V>(
        &self,
        stage: &'static str,
        prompt: &str,
        wrapper_key: &str,
        validate: V,
    ) -> Result<Vec<T>, EngineError>
    where
        T: DeserializeOwned,
        V: Fn(&[T]) -> Result<(), String>,
    {
        let model = self.generator.name().to_string();
        let start = Instant::now();

        let raw = match tokio::time::timeout(self.timeout, self.generator.generate(prompt)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                self.metrics.record_external_error();
                log_model_call(&model, stage, false, start.elapsed().as_millis() as u64);
                return Err(EngineError::new(e.to_string(), "model_call").with_model(model));
            }
            Err(elapsed) => {
                self.metrics.record_external_error();
                log_model_call(&model, stage, false, start.elapsed().as_millis() as u64);
                return Err(EngineError::from(elapsed)
                    .with_model(model)
                    .with_context(format!("limit: {}s", self.timeout.as_secs())));
            }
        };
        log_model_call(&model, stage, true, start.elapsed().as_millis() as u64);

        let parsed = catch_unwind(AssertUnwindSafe(|| parse_wrapped_list::<T>(&raw, wrapper_key)));
        let list = match parsed {
            Ok(Ok(list)) => list,
            Ok(Err(e)) => {
                self.metrics.record_parse_error();
                return Err(EngineError::new(e.to_string(), "json_parse").with_model(model));
            }
            Err(_) => {
                self.metrics.record_parse_error();
                tracing::error!(stage = stage, model = %model, "Response parser panicked");
                return Err(EngineError::new("Response parser panicked", "json_parse").with_model(model));
            }
        };

        if let Err(reason) = validate(&list) {
            self.metrics.record_parse_error();
            return Err(EngineError::new(reason, "shape").with_model(model));
        }

        Ok(list)
    }

    /// Turn a request result into an outcome, substituting `fallback` on error.
    pub(crate) fn settle<T>(
        &self,
        stage: &'static str,
        result: Result<T, EngineError>,
        fallback: impl FnOnce() -> T,
    ) -> PlanOutcome<T> {
        match result {
            Ok(payload) => {
                self.metrics.record_generated();
                PlanOutcome::Generated(payload)
            }
            Err(e) => {
                self.metrics.record_fallback();
                log_fallback(stage, &e.to_string());
                PlanOutcome::Fallback(fallback())
            }
        }
    }
}
