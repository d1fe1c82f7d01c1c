use std::future::Future;

/// External text-generation capability consumed by the planners.
///
/// Implementations return the raw model text; callers own JSON extraction,
/// timeouts and fallback.
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &str;

    fn generate(&self, prompt: &str) -> impl Future<Output = anyhow::Result<String>> + Send;
}
