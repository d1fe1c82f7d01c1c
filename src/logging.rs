/// Initialize structured logging with tracing.
/// Safe to call more than once; later calls keep the first subscriber.
pub fn init_logging() {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .json()
        );

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("Global tracing subscriber already installed");
        return;
    }

    tracing::info!("Structured logging initialized");
}

/// Log the outcome of one external planner call.
pub fn log_model_call(model: &str, stage: &str, success: bool, latency_ms: u64) {
    tracing::info!(
        model = model,
        stage = stage,
        success = success,
        latency_ms = latency_ms,
        "Model call"
    );
}

/// Log that a deterministic template replaced generated output.
pub fn log_fallback(stage: &str, reason: &str) {
    tracing::warn!(stage = stage, reason = reason, "Fallback triggered");
}
