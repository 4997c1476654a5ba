//! Optional remote field classification.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::InferenceError;

/// Answer of a classifier: a field category and a 0-100 confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldClassification {
    #[serde(rename = "type")]
    pub category: String,
    pub confidence: f64,
}

impl FieldClassification {
    pub fn other() -> Self {
        Self {
            category: "other".to_string(),
            confidence: 0.0,
        }
    }
}

/// Swappable strategy consulted for fields the local heuristics left
/// unmatched. Failures must be reported, never panicked; the matcher
/// degrades them to `unmatched`.
#[async_trait]
pub trait InferenceStrategy: Send + Sync {
    fn id(&self) -> &str;

    async fn classify(
        &self,
        label: &str,
        api_key: &str,
    ) -> Result<FieldClassification, InferenceError>;
}
