//! Credential model and backing store protocol.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Store key of the user's auth token.
pub const AUTH_TOKEN_STORE_KEY: &str = "authToken";
/// Store key of the third-party API key used for field-matching assistance.
pub const API_KEY_STORE_KEY: &str = "openaiApiKey";

/// Credentials available to the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub auth_token: Option<String>,
    pub api_key: Option<String>,
}

impl Credentials {
    pub fn is_empty(&self) -> bool {
        self.auth_token.is_none() && self.api_key.is_none()
    }
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialsPatch {
    pub auth_token: Option<String>,
    pub api_key: Option<String>,
}

impl CredentialsPatch {
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.auth_token.is_none() && self.api_key.is_none()
    }
}

/// Asynchronous key-value persistence. No transactional guarantee across
/// keys.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the backend ID.
    fn id(&self) -> &str;

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}
