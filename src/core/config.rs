use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

use crate::pipeline::state::LlmOptions;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// LLM API endpoint URL
    pub api_url: String,
    /// Model to use for all pipeline stages
    pub model: String,
    /// API key; prefer the --llm-api-key flag for one-off overrides
    pub api_key: Option<String>,
    /// Maximum tokens per stage response
    pub max_tokens: u32,
    /// Retries on rate limits and server errors
    pub max_retries: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Default similarity-search database
    pub database: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        let defaults = LlmOptions::default();
        Self {
            api_url: defaults.api_url,
            model: defaults.model,
            api_key: None,
            max_tokens: defaults.max_tokens,
            max_retries: defaults.max_retries,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            database: "nr".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl Config {
    pub fn llm_options(&self) -> LlmOptions {
        LlmOptions {
            api_url: self.llm.api_url.clone(),
            model: self.llm.model.clone(),
            api_key: self.llm.api_key.clone(),
            max_tokens: self.llm.max_tokens,
            max_retries: self.llm.max_retries,
        }
    }
}

/// Load configuration, degrading to defaults rather than failing.
///
/// A missing file is the normal first-run case. Malformed content is logged
/// and replaced by defaults so the tool keeps working; `fabula init --force`
/// rewrites a clean file.
pub fn load_or_default<P: AsRef<Path>>(path: P) -> Config {
    let path = path.as_ref();

    if !path.exists() {
        return Config::default();
    }

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read config, using defaults");
            return Config::default();
        }
    };

    match toml::from_str(&contents) {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "invalid config, using defaults");
            Config::default()
        }
    }
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<(), crate::FabulaError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let contents = toml::to_string_pretty(config)
        .map_err(|e| crate::FabulaError::Config(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, contents)?;
    Ok(())
}
