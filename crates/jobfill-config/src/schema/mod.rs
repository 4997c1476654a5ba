//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

mod schema_matcher;
mod schema_navigator;

pub use schema_matcher::*;
pub use schema_navigator::*;

/// Shared default helper used by submodules.
pub(crate) fn default_true() -> bool {
    true
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub matcher: MatcherConfig,

    #[serde(default)]
    pub filler: FillerConfig,

    #[serde(default)]
    pub navigator: NavigatorConfig,

    #[serde(default)]
    pub inference: InferenceConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Filler policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FillerConfig {
    /// Write into fields that are hidden or disabled. Off by default.
    #[serde(default)]
    pub write_invisible: bool,
}

/// Remote field classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Consult the remote strategy for fields left unmatched locally.
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_inference_url")]
    pub api_url: String,

    #[serde(default = "default_inference_model")]
    pub model: String,

    /// Labels are truncated to this many characters before being sent.
    #[serde(default = "default_max_label_chars")]
    pub max_label_chars: usize,

    #[serde(default = "default_inference_timeout")]
    pub timeout_seconds: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: default_inference_url(),
            model: default_inference_model(),
            max_label_chars: default_max_label_chars(),
            timeout_seconds: default_inference_timeout(),
        }
    }
}

fn default_inference_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_inference_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_max_label_chars() -> usize {
    50
}

fn default_inference_timeout() -> u64 {
    10
}

/// Credential store location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the credentials file. `~/.jobfill/credentials.json` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily-rolling log files. Console only when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
