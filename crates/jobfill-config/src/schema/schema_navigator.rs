//! Multi-step navigation configuration.

use serde::{Deserialize, Serialize};

use super::default_true;

/// Navigator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigatorConfig {
    /// Look for a proceed control after filling.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Case-insensitive substrings of a proceed control's text.
    #[serde(default = "default_advance_keywords")]
    pub advance_keywords: Vec<String>,

    /// Click an entry control when a page has nothing to fill.
    #[serde(default)]
    pub click_entry: bool,

    /// Case-insensitive substrings of an entry control's text.
    #[serde(default = "default_entry_keywords")]
    pub entry_keywords: Vec<String>,

    /// Rescans after the first miss before giving up.
    #[serde(default = "default_max_rescans")]
    pub max_rescans: u32,

    /// Quiet period that coalesces bursts of DOM mutations.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Longest wait for a mutation before a rescan counts as spent.
    #[serde(default = "default_mutation_wait_ms")]
    pub mutation_wait_ms: u64,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            advance_keywords: default_advance_keywords(),
            click_entry: false,
            entry_keywords: default_entry_keywords(),
            max_rescans: default_max_rescans(),
            debounce_ms: default_debounce_ms(),
            mutation_wait_ms: default_mutation_wait_ms(),
        }
    }
}

fn default_advance_keywords() -> Vec<String> {
    vec!["next".to_string(), "continue".to_string()]
}

fn default_entry_keywords() -> Vec<String> {
    vec!["apply".to_string()]
}

fn default_max_rescans() -> u32 {
    3
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_mutation_wait_ms() -> u64 {
    2000
}
