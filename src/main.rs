//! jobfill - autofill job application forms from an applicant profile.

mod cli;
mod cmd_credentials;
mod cmd_fill;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tracing::{debug, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jobfill_config::{Config, ConfigLoader, ConfigValidator, LoggingConfig};
use jobfill_protocols::KeyValueStore;
use jobfill_store_file::{FileStore, FileStoreError};

use cli::{Cli, Commands};

/// Initialize tracing with console output and, when `[logging] dir` is set,
/// daily-rotated log files.
///
/// Console logs go to stderr; stdout carries command output.
fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let file_layer = match &logging.dir {
        Some(dir) => {
            let log_dir = PathBuf::from(ConfigLoader::expand_path(dir));
            std::fs::create_dir_all(&log_dir)?;

            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("jobfill")
                .filename_suffix("log")
                .max_log_files(30)
                .build(&log_dir)?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            // Keep the writer's worker alive for the program duration.
            static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
                std::sync::OnceLock::new();
            let _ = GUARD.set(guard);

            Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
        }
        None => None,
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    Ok(())
}

/// Load the configuration; the default location may be absent.
fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => ConfigLoader::load(path)?,
        None => ConfigLoader::load_or_default(&ConfigLoader::default_path())?,
    };
    Ok(config)
}

/// Reject invalid configuration and log warnings.
fn validate_config(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let validation = ConfigValidator::validate(config)?;
    for warning in &validation.warnings {
        warn!(path = %warning.path, "{}", warning.message);
    }
    if let Some(error) = validation.into_error() {
        return Err(error.into());
    }
    Ok(())
}

/// Open the credential store: `--store`, then `[store] path`, then
/// `~/.jobfill/credentials.json`.
pub(crate) async fn open_store(
    config: &Config,
    store: Option<&Path>,
) -> Result<Arc<dyn KeyValueStore>, FileStoreError> {
    let path = match (store, &config.store.path) {
        (Some(path), _) => path.to_path_buf(),
        (None, Some(path)) => PathBuf::from(ConfigLoader::expand_path(path)),
        (None, None) => FileStore::default_location()?,
    };
    debug!("Using credential store {:?}", path);
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(path).await?);
    Ok(store)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config.logging)?;
    validate_config(&config)?;

    match cli.command {
        Commands::Scan { page } => cmd_fill::handle_scan(&page).await,
        Commands::Fill {
            page,
            profile,
            store,
            no_navigate,
            max_passes,
        } => {
            cmd_fill::handle_fill(
                config,
                &page,
                &profile,
                store.as_deref(),
                no_navigate,
                max_passes,
            )
            .await
        }
        Commands::Credentials { store, action } => {
            cmd_credentials::handle_credentials_command(&config, store.as_deref(), action).await
        }
    }
}
