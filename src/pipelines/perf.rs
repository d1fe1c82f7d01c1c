//! Latency timing for external generator calls
use std::time::Instant;

/// Times one call and emits a debug event tagged with its stage when dropped
pub struct PerfTimer {
    stage: &'static str,
    model: String,
    start: Instant,
}

impl PerfTimer {
    pub fn start(stage: &'static str, model: &str) -> Self {
        Self {
            stage,
            model: model.to_string(),
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Drop for PerfTimer {
    fn drop(&mut self) {
        tracing::debug!(
            stage = self.stage,
            model = %self.model,
            latency_ms = self.elapsed_ms(),
            "Generator call finished"
        );
    }
}
