//! Pass orchestration.
//!
//! A pass runs detect page → profile → credentials → scan → match → fill →
//! navigate against the current page instance. Awaits are the only places
//! the page can change under the engine; the page instance is checked again
//! after each of them and a pass that lost its page is cancelled.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use jobfill_config::Config;
use jobfill_protocols::{
    Document, FieldDescriptor, FillOutcome, FillStatus, InferenceStrategy, KeyValueStore,
    MatchResult, PageInstance, Profile, ProfileProvider,
};

use crate::capability::CapabilityRegistry;
use crate::credentials::CredentialStore;
use crate::emitter::{EventEmitter, InputSignal, DISPATCH_INPUT_EVENTS};
use crate::filler::Filler;
use crate::matcher::FieldMatcher;
use crate::navigator::{NavigationOutcome, Navigator};
use crate::scanner::FieldScanner;

/// Everything one completed pass saw and did.
#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    pub page: PageInstance,
    pub descriptors: Vec<FieldDescriptor>,
    pub matches: Vec<MatchResult>,
    pub outcomes: Vec<FillOutcome>,
    pub navigation: NavigationOutcome,
}

impl PassReport {
    pub fn written(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == FillStatus::Written)
            .count()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PassResult {
    Completed(PassReport),
    /// The page navigated while the pass was suspended; nothing was written.
    Cancelled { page: PageInstance },
}

impl PassResult {
    pub fn report(&self) -> Option<&PassReport> {
        match self {
            PassResult::Completed(report) => Some(report),
            PassResult::Cancelled { .. } => None,
        }
    }
}

/// Drives autofill passes over one host document.
pub struct AutofillEngine {
    config: Config,
    document: Arc<dyn Document>,
    profiles: Arc<dyn ProfileProvider>,
    credentials: CredentialStore,
    capabilities: Arc<CapabilityRegistry<dyn InputSignal>>,
    strategy: Option<Arc<dyn InferenceStrategy>>,
    scanner: FieldScanner,
    matcher: FieldMatcher,
    navigator: Navigator,
    profile: Option<Profile>,
}

impl AutofillEngine {
    pub fn new(
        config: &Config,
        document: Arc<dyn Document>,
        profiles: Arc<dyn ProfileProvider>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            config: config.clone(),
            document,
            profiles,
            credentials: CredentialStore::new(store),
            capabilities: Arc::new(CapabilityRegistry::new()),
            strategy: None,
            scanner: FieldScanner::new(),
            matcher: FieldMatcher::new(&config.matcher),
            navigator: Navigator::new(config.navigator.clone()),
            profile: None,
        }
    }

    /// Consult `strategy` for fields the local layers leave unmatched.
    /// Only used when `[inference] enabled` is set and an API key is stored.
    pub fn with_strategy(mut self, strategy: Arc<dyn InferenceStrategy>) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Share a capability registry with the host. An input signal
    /// registered under `dispatchInputEvents` replaces the default emitter.
    pub fn with_capabilities(
        mut self,
        capabilities: Arc<CapabilityRegistry<dyn InputSignal>>,
    ) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn capabilities(&self) -> &Arc<CapabilityRegistry<dyn InputSignal>> {
        &self.capabilities
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn document(&self) -> &Arc<dyn Document> {
        &self.document
    }

    /// Run one pass over the current page.
    pub async fn run_pass(&mut self) -> PassResult {
        let document = Arc::clone(&self.document);
        let doc = document.as_ref();

        let page = doc.page();
        if self.navigator.observe_page(&page) {
            self.credentials.reset();
            self.profile = None;
        }
        let profile = self.profile_for_page();

        let credentials = self.credentials.get().await;
        if doc.page() != page {
            return self.cancelled(page);
        }

        let descriptors = self.scanner.scan(doc, doc.root());
        let matches = match (
            self.config.inference.enabled,
            self.strategy.as_ref(),
            credentials.api_key.as_deref(),
        ) {
            (true, Some(strategy), Some(api_key)) => {
                self.matcher
                    .match_with_assist(&descriptors, &profile, strategy.as_ref(), api_key)
                    .await
            }
            (true, Some(_), None) => {
                debug!("Inference enabled but no API key stored");
                self.matcher.match_fields(&descriptors, &profile)
            }
            _ => self.matcher.match_fields(&descriptors, &profile),
        };
        if doc.page() != page {
            return self.cancelled(page);
        }

        let plan = FieldMatcher::plan(matches.clone());
        let filler = Filler::from_config(self.input_signal(), &self.config.filler);
        let outcomes = filler.fill(doc, &plan);

        let entered = if descriptors.iter().any(|d| d.visible) {
            None
        } else {
            self.navigator.try_enter(doc)
        };
        let navigation = match entered {
            Some(control) => NavigationOutcome::Entered { control },
            None => self.navigator.run(doc).await,
        };

        let report = PassReport {
            page,
            descriptors,
            matches,
            outcomes,
            navigation,
        };
        info!(
            page = %report.page.id,
            fields = report.descriptors.len(),
            planned = plan.len(),
            written = report.written(),
            navigation = ?report.navigation,
            "Pass completed"
        );
        PassResult::Completed(report)
    }

    fn profile_for_page(&mut self) -> Profile {
        match &self.profile {
            Some(profile) => profile.clone(),
            None => {
                let profile = self.profiles.get_profile();
                debug!(keys = profile.len(), "Loaded profile");
                self.profile = Some(profile.clone());
                profile
            }
        }
    }

    /// The registered input signal, registering the default emitter when the
    /// registry has none.
    fn input_signal(&self) -> Arc<dyn InputSignal> {
        if let Some(signal) = self.capabilities.get(DISPATCH_INPUT_EVENTS) {
            return signal;
        }
        let signal: Arc<dyn InputSignal> = Arc::new(EventEmitter::new());
        if let Err(e) = self.capabilities.register(Arc::clone(&signal)) {
            debug!(error = %e, "Input signal registered concurrently");
        }
        self.capabilities
            .get(DISPATCH_INPUT_EVENTS)
            .unwrap_or(signal)
    }

    fn cancelled(&self, page: PageInstance) -> PassResult {
        info!(page = %page.id, "Page changed mid-pass; discarding");
        PassResult::Cancelled { page }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
