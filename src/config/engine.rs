use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use chrono::{DateTime, NaiveDate, Utc};
use lazy_static::lazy_static;
use crate::error::EngineError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Model used for both study plans and roadmaps
    pub planner_model: String,
    pub ollama_base_url: String,
    /// Upper bound on one external planner call
    pub request_timeout_secs: u64,
    /// Plan length when no exam date is known
    pub default_days_remaining: u32,
    /// Pinned "today" for days-remaining arithmetic. None uses the clock.
    pub reference_today: Option<NaiveDate>,
    /// Transcript prefix appended to each lecture title when deriving topics
    pub topic_transcript_chars: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            planner_model: "qwen2.5:7b-instruct".to_string(),
            ollama_base_url: "http://localhost:11434".to_string(),
            request_timeout_secs: 60,
            default_days_remaining: 7,
            reference_today: None,
            topic_transcript_chars: 200,
        }
    }
}

impl EngineConfig {
    /// Parse an explicit TOML document; missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, EngineError> {
        toml::from_str::<EngineConfig>(content)
            .map_err(|e| EngineError::new(
                format!("Failed to parse engine config: {}", e),
                "config"
            ).with_source("toml"))
    }

    /// Instant that days-remaining is measured from.
    pub fn reference_instant(&self) -> DateTime<Utc> {
        match self.reference_today.and_then(|d| d.and_hms_opt(0, 0, 0)) {
            Some(midnight) => midnight.and_utc(),
            None => Utc::now(),
        }
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}

fn get_config_path() -> PathBuf {
    if let Some(explicit) = std::env::var_os("KMS_ENGINE_CONFIG") {
        return PathBuf::from(explicit);
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            dir.push("Library/Application Support/kms-engine");
            dir.push("kms_engine.toml");
            return dir;
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            let mut dir = PathBuf::from(appdata);
            dir.push("kms-engine");
            dir.push("kms_engine.toml");
            return dir;
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            dir.push(".local/share/kms-engine");
            dir.push("kms_engine.toml");
            return dir;
        }
    }

    PathBuf::from("kms_engine.toml")
}

fn load_engine_config_internal() -> EngineConfig {
    let config_path = get_config_path();

    match fs::read_to_string(&config_path) {
        Ok(content) => match EngineConfig::from_toml_str(&content) {
            Ok(config) => {
                tracing::info!(path = ?config_path, "Loaded engine config");
                return config;
            }
            Err(e) => {
                tracing::warn!(path = ?config_path, error = %e, "Invalid engine config, using defaults");
            }
        },
        Err(e) => {
            tracing::debug!(path = ?config_path, error = %e, "No engine config file, using defaults");
        }
    }

    EngineConfig::default()
}

lazy_static! {
    static ref ENGINE_CONFIG: EngineConfig = load_engine_config_internal();
}

/// Get the cached engine configuration (loaded once on first use)
pub fn get_engine_config() -> &'static EngineConfig {
    &ENGINE_CONFIG
}
