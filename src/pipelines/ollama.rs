use reqwest::Client;
use serde::{Deserialize, Serialize};
use anyhow::{Result, Context};
use tokio::time::Duration;
use crate::config::engine::EngineConfig;
use crate::error::EngineError;
use crate::pipelines::generator::TextGenerator;
use crate::pipelines::perf;

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
    #[serde(default)]
    done: bool,
}

/// Generative planner backed by a local Ollama server.
#[derive(Clone)]
pub struct OllamaGenerator {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaGenerator {
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .tcp_keepalive(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| EngineError::new(
                format!("Failed to create HTTP client: {}", e),
                "startup"
            ).with_source("reqwest"))?;

        Ok(OllamaGenerator {
            client,
            base_url: config.ollama_base_url.trim_end_matches('/').to_string(),
            model: config.planner_model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Join the `response` fragments of a line-delimited Ollama reply.
pub fn collect_stream_text(body: &str) -> String {
    let mut full_response = String::new();
    for line in body.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if let Ok(chunk) = serde_json::from_str::<OllamaResponse>(line) {
            full_response.push_str(&chunk.response);
            if chunk.done {
                break;
            }
        }
    }
    full_response
}

impl TextGenerator for OllamaGenerator {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let _perf = perf::PerfTimer::start("model_call", &self.model);

        let response = self.client
            .post(format!("{}/api/generate", self.base_url))
            .json(&OllamaRequest {
                model: &self.model,
                prompt,
                stream: false,
            })
            .send()
            .await
            .with_context(|| format!("Failed to connect to Ollama API for model '{}'", self.model))?
            .error_for_status()
            .with_context(|| format!("Ollama API rejected request for model '{}'", self.model))?;

        let body = response.text().await
            .with_context(|| format!("Failed to read response from model '{}'", self.model))?;

        let text = collect_stream_text(&body);
        if text.is_empty() {
            anyhow::bail!("Model '{}' returned empty response", self.model);
        }

        Ok(text)
    }
}
