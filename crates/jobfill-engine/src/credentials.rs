//! Cached credential access.
//!
//! Credentials are read from the backing [`KeyValueStore`] once per page
//! context and cached. A store failure reads as "no credentials configured";
//! it never reaches the caller as an error.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::{debug, warn};

use jobfill_protocols::{
    Credentials, CredentialsPatch, KeyValueStore, StoreError, API_KEY_STORE_KEY,
    AUTH_TOKEN_STORE_KEY,
};

pub struct CredentialStore {
    backend: Arc<dyn KeyValueStore>,
    cache: Mutex<Option<Credentials>>,
    /// Bumped on every page context reset. A read that started under an
    /// older epoch must not fill the new context's cache.
    epoch: AtomicU64,
}

impl CredentialStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            cache: Mutex::new(None),
            epoch: AtomicU64::new(0),
        }
    }

    /// Current credentials; empty when the store is unavailable.
    pub async fn get(&self) -> Credentials {
        if let Some(cached) = self.cache.lock().clone() {
            return cached;
        }

        let epoch = self.epoch.load(Ordering::SeqCst);
        let credentials = match self.load().await {
            Ok(credentials) => credentials,
            Err(e) => {
                warn!(store = self.backend.id(), error = %e, "Credential store unavailable");
                return Credentials::default();
            }
        };

        if self.epoch.load(Ordering::SeqCst) == epoch {
            *self.cache.lock() = Some(credentials.clone());
        } else {
            debug!("Discarding credentials read from a previous page context");
        }
        credentials
    }

    /// Persist the fields present in `patch`. Failures are logged and
    /// swallowed.
    pub async fn set(&self, patch: CredentialsPatch) {
        if let Some(token) = patch.auth_token {
            if self.write(AUTH_TOKEN_STORE_KEY, &token).await {
                if let Some(cached) = self.cache.lock().as_mut() {
                    cached.auth_token = Some(token);
                }
            }
        }
        if let Some(key) = patch.api_key {
            if self.write(API_KEY_STORE_KEY, &key).await {
                if let Some(cached) = self.cache.lock().as_mut() {
                    cached.api_key = Some(key);
                }
            }
        }
    }

    /// Start a new page context.
    pub fn reset(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        *self.cache.lock() = None;
    }

    async fn load(&self) -> Result<Credentials, StoreError> {
        let auth_token = self.backend.get(AUTH_TOKEN_STORE_KEY).await?;
        let api_key = self.backend.get(API_KEY_STORE_KEY).await?;
        Ok(Credentials {
            auth_token: auth_token.filter(|v| !v.is_empty()),
            api_key: api_key.filter(|v| !v.is_empty()),
        })
    }

    async fn write(&self, key: &str, value: &str) -> bool {
        match self.backend.set(key, value).await {
            Ok(()) => true,
            Err(e) => {
                warn!(store = self.backend.id(), key, error = %e, "Failed to persist credential");
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod tests;
