//! Credentials subcommand handlers for jobfill.

use std::path::Path;

use tracing::info;

use jobfill_config::Config;
use jobfill_engine::CredentialStore;
use jobfill_protocols::{Credentials, API_KEY_STORE_KEY, AUTH_TOKEN_STORE_KEY};

use crate::cli::CredentialsAction;
use crate::open_store;

/// Handle credentials subcommands.
pub(crate) async fn handle_credentials_command(
    config: &Config,
    store: Option<&Path>,
    action: CredentialsAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        CredentialsAction::Show => credentials_show(config, store).await,
        CredentialsAction::Set { auth_token, api_key } => {
            credentials_set(config, store, auth_token, api_key).await
        }
    }
}

async fn credentials_show(
    config: &Config,
    store: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let backend = open_store(config, store).await?;
    let credentials = CredentialStore::new(backend).get().await;

    println!("{}", serde_json::to_string_pretty(&masked(&credentials))?);
    Ok(())
}

async fn credentials_set(
    config: &Config,
    store: Option<&Path>,
    auth_token: Option<String>,
    api_key: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    if auth_token.is_none() && api_key.is_none() {
        return Err("Nothing to set: pass --auth-token and/or --api-key".into());
    }

    let backend = open_store(config, store).await?;
    if let Some(token) = auth_token {
        backend.set(AUTH_TOKEN_STORE_KEY, token.trim()).await?;
        info!("Stored auth token");
    }
    if let Some(key) = api_key {
        backend.set(API_KEY_STORE_KEY, key.trim()).await?;
        info!("Stored API key");
    }
    Ok(())
}

fn masked(credentials: &Credentials) -> Credentials {
    Credentials {
        auth_token: credentials.auth_token.as_deref().map(mask),
        api_key: credentials.api_key.as_deref().map(mask),
    }
}

/// Keep the last four characters of secrets long enough to identify.
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), tail)
}
