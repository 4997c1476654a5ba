//! CLI definitions for jobfill.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// jobfill CLI.
#[derive(Parser)]
#[command(name = "jobfill")]
#[command(about = "Autofill job application forms from an applicant profile")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (defaults to ~/.jobfill/config.toml)
    #[arg(short, long, global = true, env = "JOBFILL_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// List the fillable fields of a page snapshot
    Scan {
        /// Page snapshot (JSON)
        #[arg(short, long)]
        page: PathBuf,
    },

    /// Fill a page snapshot from a profile, following proceed controls
    Fill {
        /// Page snapshot (JSON)
        #[arg(short, long)]
        page: PathBuf,

        /// Applicant profile (JSON object)
        #[arg(long)]
        profile: PathBuf,

        /// Credentials file (overrides [store] path)
        #[arg(long)]
        store: Option<PathBuf>,

        /// Fill only, never click
        #[arg(long)]
        no_navigate: bool,

        /// Upper bound on passes over successive pages
        #[arg(long, default_value_t = 10)]
        max_passes: u32,
    },

    /// Credential store management
    Credentials {
        /// Credentials file (overrides [store] path)
        #[arg(long, global = true)]
        store: Option<PathBuf>,

        #[command(subcommand)]
        action: CredentialsAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum CredentialsAction {
    /// Show stored credentials (masked)
    Show,

    /// Update stored credentials
    Set {
        /// User auth token
        #[arg(long)]
        auth_token: Option<String>,

        /// API key for field-matching assistance
        #[arg(long, env = "JOBFILL_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },
}
