//! OpenAI-backed field classifier.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use jobfill_config::InferenceConfig;
use jobfill_protocols::{FieldClassification, InferenceError, InferenceStrategy};

use crate::api::{ApiMessage, ApiRequest, ApiResponse};

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_MAX_LABEL_CHARS: usize = 50;
const MAX_TOKENS: u32 = 50;

/// Categories the model may answer with.
pub const FIELD_TYPES: &[&str] = &[
    "first_name",
    "last_name",
    "email",
    "phone",
    "resume",
    "cover_letter",
    "sponsorship",
    "dei",
    "other",
];

const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that identifies form field types for job applications.";

/// Classifies form field labels with a chat-completions model.
pub struct OpenAiClassifier {
    api_url: String,
    model: String,
    max_label_chars: usize,
    client: reqwest::Client,
}

impl OpenAiClassifier {
    pub fn new() -> Self {
        Self::with_url(DEFAULT_API_URL.to_string())
    }

    /// Create a classifier with a custom API URL (for OpenAI-compatible APIs).
    pub fn with_url(api_url: String) -> Self {
        Self {
            api_url,
            model: DEFAULT_MODEL.to_string(),
            max_label_chars: DEFAULT_MAX_LABEL_CHARS,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &InferenceConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            api_url: config.api_url.clone(),
            model: config.model.clone(),
            max_label_chars: config.max_label_chars,
            client,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn build_request(&self, label: &str) -> ApiRequest {
        let label: String = label.chars().take(self.max_label_chars).collect();
        let prompt = format!(
            "Identify the type of form field for the following label: \"{}\". \
             Respond in valid JSON format with keys \"type\" and \"confidence\". \
             \"type\" must be one of: {}. \
             \"confidence\" must be a number between 0 and 100 indicating your confidence.",
            label,
            FIELD_TYPES.join(", ")
        );
        ApiRequest {
            model: self.model.clone(),
            messages: vec![ApiMessage::system(SYSTEM_PROMPT), ApiMessage::user(prompt)],
            max_tokens: MAX_TOKENS,
            temperature: 0.0,
        }
    }

    async fn send_request(
        &self,
        api_request: &ApiRequest,
        api_key: &str,
    ) -> Result<ApiResponse, InferenceError> {
        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(api_request)
            .send()
            .await
            .map_err(|e| InferenceError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(InferenceError::Api {
                status,
                message: text,
            });
        }

        response
            .json()
            .await
            .map_err(|e| InferenceError::InvalidResponse(e.to_string()))
    }
}

impl Default for OpenAiClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceStrategy for OpenAiClassifier {
    fn id(&self) -> &str {
        "openai"
    }

    async fn classify(
        &self,
        label: &str,
        api_key: &str,
    ) -> Result<FieldClassification, InferenceError> {
        if api_key.trim().is_empty() {
            return Err(InferenceError::Unavailable("no API key".to_string()));
        }
        let api_request = self.build_request(label);
        let response = self.send_request(&api_request, api_key).await?;
        let content = response
            .first_content()
            .ok_or_else(|| InferenceError::InvalidResponse("empty completion".to_string()))?;
        let classification = parse_classification(content)?;
        debug!(
            label,
            category = %classification.category,
            confidence = classification.confidence,
            "Classified field"
        );
        Ok(classification)
    }
}

/// Parse the model's answer. Code fences are tolerated, categories outside
/// [`FIELD_TYPES`] read as `other` and the confidence is clamped to 0-100.
fn parse_classification(content: &str) -> Result<FieldClassification, InferenceError> {
    let body = strip_fences(content);
    let mut classification: FieldClassification = serde_json::from_str(body)
        .map_err(|e| InferenceError::InvalidResponse(format!("{}: {}", e, body)))?;

    let category = classification.category.trim().to_lowercase();
    classification.category = if FIELD_TYPES.contains(&category.as_str()) {
        category
    } else {
        "other".to_string()
    };
    if !classification.confidence.is_finite() {
        return Err(InferenceError::InvalidResponse(
            "confidence is not a number".to_string(),
        ));
    }
    classification.confidence = classification.confidence.clamp(0.0, 100.0);
    Ok(classification)
}

fn strip_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
