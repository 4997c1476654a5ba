//! Multi-step navigation.
//!
//! After a page's plan has been filled the navigator looks for a proceed
//! control ("Next", "Continue") and clicks it at most once per page
//! instance. When none is present it waits for the page to mutate, lets a
//! burst of mutations settle and looks again, a bounded number of times.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{debug, info, warn};

use jobfill_config::NavigatorConfig;
use jobfill_protocols::{Document, ElementRef, ElementSnapshot, NavigationState, PageInstance};

use crate::dom_walk::{element, is_inert, text_content};

/// Lifecycle of the navigator on one page instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigatorState {
    Idle,
    ScanningForControl,
    Advancing,
    /// Terminal until a new page instance is observed.
    Done,
}

/// What a navigator run ended with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NavigationOutcome {
    /// A proceed control was clicked.
    Advanced { control: String },
    /// The entry control was clicked instead of filling.
    Entered { control: String },
    /// The click on the chosen control was rejected by the page.
    ClickFailed { control: String },
    /// No control turned up within the rescan budget.
    NoControl { rescans: u32 },
    /// This page instance was already advanced.
    AlreadyAdvanced,
    /// An earlier run on this page instance already gave up.
    AlreadyDone,
    /// The page navigated away while the navigator was waiting.
    PageChanged,
    /// Navigation is switched off.
    Disabled,
}

impl NavigationOutcome {
    /// Whether a click went out that may lead to a new page.
    pub fn clicked(&self) -> bool {
        matches!(
            self,
            NavigationOutcome::Advanced { .. } | NavigationOutcome::Entered { .. }
        )
    }
}

/// A clickable element whose text carries one of the keywords.
#[derive(Debug)]
struct Control {
    element: ElementRef,
    text: String,
}

pub struct Navigator {
    config: NavigatorConfig,
    page: Option<PageInstance>,
    state: NavigatorState,
    navigation: NavigationState,
}

impl Navigator {
    pub fn new(config: NavigatorConfig) -> Self {
        Self {
            config,
            page: None,
            state: NavigatorState::Idle,
            navigation: NavigationState::default(),
        }
    }

    pub fn state(&self) -> NavigatorState {
        self.state
    }

    pub fn navigation_state(&self) -> &NavigationState {
        &self.navigation
    }

    /// Track the current page instance. A different instance resets all
    /// per-page state; returns `true` in that case.
    pub fn observe_page(&mut self, page: &PageInstance) -> bool {
        if self.page.as_ref() == Some(page) {
            return false;
        }
        debug!(page = %page.id, url = %page.url, "New page instance");
        self.page = Some(page.clone());
        self.reset();
        true
    }

    pub fn reset(&mut self) {
        self.state = NavigatorState::Idle;
        self.navigation.reset();
    }

    /// Click the entry control ("Apply") if enabled and not yet done on this
    /// page instance. Returns the control's text when clicked.
    pub fn try_enter(&mut self, doc: &dyn Document) -> Option<String> {
        if !self.config.click_entry || self.navigation.attempted_entry {
            return None;
        }
        let control = find_control(doc, &self.config.entry_keywords)?;
        self.navigation.mark_entered();
        match doc.click(control.element) {
            Ok(()) => {
                info!(control = %control.text, "Clicked entry control");
                Some(control.text)
            }
            Err(e) => {
                warn!(control = %control.text, error = %e, "Entry click rejected");
                None
            }
        }
    }

    /// Look for a proceed control and click it, rescanning after page
    /// mutations until the budget is spent.
    pub async fn run(&mut self, doc: &dyn Document) -> NavigationOutcome {
        if !self.config.enabled {
            self.state = NavigatorState::Done;
            return NavigationOutcome::Disabled;
        }
        if self.navigation.attempted_advance {
            self.state = NavigatorState::Done;
            return NavigationOutcome::AlreadyAdvanced;
        }
        if self.state == NavigatorState::Done {
            return NavigationOutcome::AlreadyDone;
        }

        // Subscribe before the first scan so no mutation slips in between.
        let mut mutations = doc.mutations();
        self.state = NavigatorState::ScanningForControl;

        let mut rescans = 0;
        loop {
            if self.page.as_ref().is_some_and(|page| *page != doc.page()) {
                debug!("Page changed while looking for proceed control");
                self.state = NavigatorState::Done;
                return NavigationOutcome::PageChanged;
            }
            if let Some(control) = find_control(doc, &self.config.advance_keywords) {
                return self.advance(doc, control);
            }
            if rescans >= self.config.max_rescans || !self.settle(&mut mutations).await {
                break;
            }
            rescans += 1;
            debug!(rescans, "Rescanning for proceed control");
        }

        self.state = NavigatorState::Done;
        info!(rescans, "No proceed control found");
        NavigationOutcome::NoControl { rescans }
    }

    fn advance(&mut self, doc: &dyn Document, control: Control) -> NavigationOutcome {
        self.state = NavigatorState::Advancing;
        if !self.navigation.mark_advanced(Instant::now()) {
            self.state = NavigatorState::Done;
            return NavigationOutcome::AlreadyAdvanced;
        }
        let outcome = match doc.click(control.element) {
            Ok(()) => {
                info!(control = %control.text, "Advanced to next step");
                NavigationOutcome::Advanced {
                    control: control.text,
                }
            }
            Err(e) => {
                warn!(control = %control.text, error = %e, "Proceed click rejected");
                NavigationOutcome::ClickFailed {
                    control: control.text,
                }
            }
        };
        self.state = NavigatorState::Done;
        outcome
    }

    /// Wait for a mutation, then for a quiet period of `debounce_ms`. A steady
    /// stream of mutations is cut off after `mutation_wait_ms`. Returns
    /// `false` when nothing changed in time.
    async fn settle(&self, mutations: &mut watch::Receiver<u64>) -> bool {
        let wait = Duration::from_millis(self.config.mutation_wait_ms);
        let debounce = Duration::from_millis(self.config.debounce_ms);

        match timeout(wait, mutations.changed()).await {
            Ok(Ok(())) => {}
            Ok(Err(_)) | Err(_) => return false,
        }

        let deadline = Instant::now() + wait;
        loop {
            let quiet_until = (Instant::now() + debounce).min(deadline);
            match timeout_at(quiet_until, mutations.changed()).await {
                Ok(Ok(())) if Instant::now() < deadline => continue,
                _ => return true,
            }
        }
    }
}

/// First visible, enabled clickable element in document order whose text
/// contains one of `keywords`, case-insensitively.
fn find_control(doc: &dyn Document, keywords: &[String]) -> Option<Control> {
    let keywords: Vec<String> = keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();
    if keywords.is_empty() {
        return None;
    }
    search(doc, doc.root(), &keywords)
}

fn search(doc: &dyn Document, node: ElementRef, keywords: &[String]) -> Option<Control> {
    let snapshot = element(doc, node)?;
    if is_inert(&snapshot.tag) || snapshot.hidden {
        return None;
    }
    if is_clickable(&snapshot) {
        if snapshot.is_disabled() {
            return None;
        }
        let text = control_text(doc, node, &snapshot);
        let lowered = text.to_lowercase();
        if keywords.iter().any(|k| lowered.contains(k.as_str())) {
            return Some(Control { element: node, text });
        }
    }
    if let Some(frame) = doc.frame_root(node) {
        return search(doc, frame, keywords);
    }
    doc.children(node)
        .into_iter()
        .find_map(|child| search(doc, child, keywords))
}

fn is_clickable(snapshot: &ElementSnapshot) -> bool {
    match snapshot.tag.as_str() {
        "button" | "a" => true,
        "input" => matches!(snapshot.input_type().as_str(), "submit" | "button"),
        _ => snapshot
            .attr("role")
            .is_some_and(|r| r.eq_ignore_ascii_case("button")),
    }
}

fn control_text(
    doc: &dyn Document,
    node: ElementRef,
    snapshot: &ElementSnapshot,
) -> String {
    let text = if snapshot.tag == "input" {
        snapshot
            .attr("value")
            .map(str::to_string)
            .unwrap_or_else(|| snapshot.value.clone())
    } else {
        text_content(doc, node)
    };
    let text = text.trim();
    if !text.is_empty() {
        return text.to_string();
    }
    snapshot
        .attr("aria-label")
        .map(|l| l.trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "navigator_tests.rs"]
mod tests;
