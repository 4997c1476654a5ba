//! Scan and fill subcommand handlers for jobfill.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use jobfill_config::Config;
use jobfill_dom::{MemoryDocument, PageSnapshot};
use jobfill_engine::{AutofillEngine, FieldScanner, MemoryStore, PassResult};
use jobfill_inference_openai::OpenAiClassifier;
use jobfill_protocols::{Document, KeyValueStore, Profile, StaticProfile};

use crate::open_store;

/// Print the fields the scanner finds on a page snapshot.
pub(crate) async fn handle_scan(page: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = PageSnapshot::load(page)?;
    let doc = MemoryDocument::new(&snapshot);

    let descriptors = FieldScanner::new().scan(&doc, doc.root());
    info!(url = %snapshot.url, fields = descriptors.len(), "Scanned page");

    println!("{}", serde_json::to_string_pretty(&descriptors)?);
    Ok(())
}

/// Run autofill passes over a page snapshot until navigation stops.
pub(crate) async fn handle_fill(
    mut config: Config,
    page: &Path,
    profile: &Path,
    store: Option<&Path>,
    no_navigate: bool,
    max_passes: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    if no_navigate {
        config.navigator.enabled = false;
    }

    let snapshot = PageSnapshot::load(page)?;
    let profile = load_profile(profile)?;
    let store = open_store_or_empty(&config, store).await;
    let doc = Arc::new(MemoryDocument::new(&snapshot));

    let mut engine = AutofillEngine::new(
        &config,
        doc.clone(),
        Arc::new(StaticProfile::new(profile)),
        store,
    );
    if config.inference.enabled {
        engine = engine.with_strategy(Arc::new(OpenAiClassifier::from_config(&config.inference)));
    }

    let mut reports = Vec::new();
    for pass in 1..=max_passes.max(1) {
        let before = doc.page();
        let result = engine.run_pass().await;

        let advanced = match &result {
            PassResult::Completed(report) => {
                info!(
                    pass,
                    written = report.written(),
                    fields = report.descriptors.len(),
                    "Pass completed"
                );
                report.navigation.clicked() && doc.page() != before
            }
            PassResult::Cancelled { page } => {
                warn!(pass, page = %page.id, "Pass cancelled by page change");
                true
            }
        };
        reports.push(result);

        if !advanced {
            break;
        }
    }

    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}

/// The configured credential store, or an empty one when it cannot be
/// opened. Filling never depends on stored credentials.
async fn open_store_or_empty(config: &Config, store: Option<&Path>) -> Arc<dyn KeyValueStore> {
    match open_store(config, store).await {
        Ok(store) => store,
        Err(e) => {
            warn!(error = %e, "Credential store unavailable, continuing without credentials");
            Arc::new(MemoryStore::new())
        }
    }
}

/// Read a profile: a JSON object of keys to strings, numbers, booleans or
/// arrays of those.
fn load_profile(path: &Path) -> Result<Profile, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read profile {}: {}", path.display(), e))?;
    let profile: Profile = serde_json::from_str(&content)
        .map_err(|e| format!("Invalid profile {}: {}", path.display(), e))?;
    if profile.is_empty() {
        warn!("Profile {} has no entries", path.display());
    }
    Ok(profile)
}
