use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters for planner activity. Observability only.
#[derive(Clone, Default, Debug)]
pub struct Metrics {
    /// Plans/roadmaps taken from generated output
    pub generated_count: Arc<AtomicU64>,
    /// Plans/roadmaps replaced by a template
    pub fallback_count: Arc<AtomicU64>,
    /// External calls that errored or timed out
    pub external_errors: Arc<AtomicU64>,
    /// Responses that arrived but could not be used
    pub parse_errors: Arc<AtomicU64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub generated_count: u64,
    pub fallback_count: u64,
    pub external_errors: u64,
    pub parse_errors: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_generated(&self) {
        self.generated_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback(&self) {
        self.fallback_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_external_error(&self) {
        self.external_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_parse_error(&self) {
        self.parse_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            generated_count: self.generated_count.load(Ordering::Relaxed),
            fallback_count: self.fallback_count.load(Ordering::Relaxed),
            external_errors: self.external_errors.load(Ordering::Relaxed),
            parse_errors: self.parse_errors.load(Ordering::Relaxed),
        }
    }
}
