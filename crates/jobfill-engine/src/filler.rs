//! Plan execution.
//!
//! Each entry is written, signalled through the [`InputSignal`] capability
//! and read back. Entries run in plan order; nothing is retried.

use std::sync::Arc;

use tracing::{debug, info, warn};

use jobfill_config::FillerConfig;
use jobfill_protocols::{
    Document, DomError, ElementRef, ElementSnapshot, FillOutcome, FillPlan, FillStatus,
    InputKind, MatchResult, Scalar,
};

use crate::dom_walk::element;
use crate::emitter::{Delivery, InputSignal};
use crate::matcher::normalize::normalize;
use crate::radio_group::{radio_group, RadioOption};

pub struct Filler {
    signal: Arc<dyn InputSignal>,
    write_invisible: bool,
}

impl Filler {
    pub fn new(signal: Arc<dyn InputSignal>) -> Self {
        Self {
            signal,
            write_invisible: false,
        }
    }

    pub fn from_config(signal: Arc<dyn InputSignal>, config: &FillerConfig) -> Self {
        Self::new(signal).with_write_invisible(config.write_invisible)
    }

    /// Also write fields that are hidden by style. Disabled and file inputs
    /// are still skipped.
    pub fn with_write_invisible(mut self, write_invisible: bool) -> Self {
        self.write_invisible = write_invisible;
        self
    }

    pub fn fill(&self, doc: &dyn Document, plan: &FillPlan) -> Vec<FillOutcome> {
        let outcomes: Vec<FillOutcome> = plan
            .iter()
            .map(|result| FillOutcome {
                status: self.fill_one(doc, result),
                result: result.clone(),
            })
            .collect();

        info!(
            planned = plan.len(),
            written = outcomes
                .iter()
                .filter(|o| o.status == FillStatus::Written)
                .count(),
            "Filled plan"
        );
        outcomes
    }

    fn fill_one(&self, doc: &dyn Document, result: &MatchResult) -> FillStatus {
        let descriptor = &result.descriptor;
        let node = descriptor.element;

        if descriptor.kind == InputKind::File
            || descriptor.disabled
            || (!descriptor.visible && !self.write_invisible)
        {
            return FillStatus::SkippedInvisible;
        }
        let Some(current) = element(doc, node) else {
            debug!(label = %descriptor.label, "Field detached before write");
            return FillStatus::SkippedDetached;
        };
        let Some(value) = result.value.as_ref() else {
            warn!(label = %descriptor.label, "Matched field carries no value");
            return FillStatus::VerifyFailed;
        };

        let write = match descriptor.kind {
            InputKind::Text | InputKind::Textarea => self.write_text(doc, result, value),
            InputKind::Select => self.write_select(doc, result, &current, value),
            InputKind::Checkbox => self.write_checkbox(doc, result, value),
            InputKind::Radio => self.write_radio(doc, result, value),
            InputKind::File => return FillStatus::SkippedInvisible,
        };

        let status = match write {
            Ok(status) => status,
            Err(DomError::Detached) => FillStatus::SkippedDetached,
            Err(e) => {
                warn!(label = %descriptor.label, error = %e, "Write rejected");
                FillStatus::VerifyFailed
            }
        };
        debug!(
            label = %descriptor.label,
            key = result.profile_key.as_deref().unwrap_or_default(),
            status = ?status,
            "Filled field"
        );
        status
    }

    /// Signal the write to `node` and verify it with `stuck`.
    fn commit(
        &self,
        doc: &dyn Document,
        node: ElementRef,
        stuck: impl FnOnce(&ElementSnapshot) -> bool,
    ) -> Result<FillStatus, DomError> {
        if self.signal.fire_input_signal(doc, node) == Delivery::Detached {
            return Ok(FillStatus::SkippedDetached);
        }
        match element(doc, node) {
            Some(after) if stuck(&after) => Ok(FillStatus::Written),
            Some(_) => Ok(FillStatus::VerifyFailed),
            None => Ok(FillStatus::SkippedDetached),
        }
    }

    fn write_text(
        &self,
        doc: &dyn Document,
        result: &MatchResult,
        value: &Scalar,
    ) -> Result<FillStatus, DomError> {
        let text = value.to_string();
        doc.set_value(result.descriptor.element, &text)?;
        self.commit(doc, result.descriptor.element, |after| after.value == text)
    }

    fn write_select(
        &self,
        doc: &dyn Document,
        result: &MatchResult,
        current: &ElementSnapshot,
        value: &Scalar,
    ) -> Result<FillStatus, DomError> {
        let Some(index) = choose_option(current, &value.to_string()) else {
            return Ok(FillStatus::SkippedNoOption);
        };
        doc.select_index(result.descriptor.element, index)?;
        self.commit(doc, result.descriptor.element, |after| {
            after.selected_index == Some(index)
        })
    }

    fn write_checkbox(
        &self,
        doc: &dyn Document,
        result: &MatchResult,
        value: &Scalar,
    ) -> Result<FillStatus, DomError> {
        let Some(checked) = value.as_bool() else {
            return Ok(FillStatus::SkippedNoOption);
        };
        doc.set_checked(result.descriptor.element, checked)?;
        self.commit(doc, result.descriptor.element, |after| after.checked == checked)
    }

    /// The matched radio stands for its whole group: the member the value
    /// picks is checked. Radios are only ever checked, never unchecked.
    fn write_radio(
        &self,
        doc: &dyn Document,
        result: &MatchResult,
        value: &Scalar,
    ) -> Result<FillStatus, DomError> {
        let descriptor = &result.descriptor;
        let group = radio_group(doc, descriptor.element);
        let Some(choice) = choose_radio(&group, descriptor.element, &descriptor.label, value)
        else {
            return Ok(FillStatus::SkippedNoOption);
        };
        if choice != descriptor.element {
            debug!(
                label = %descriptor.label,
                members = group.len(),
                "Resolved radio group member"
            );
        }
        doc.set_checked(choice, true)?;
        self.commit(doc, choice, |after| after.checked)
    }
}

/// Option for `wanted`: exact text (case-insensitive), then option value,
/// then text containing the value. Disabled options are never chosen.
fn choose_option(select: &ElementSnapshot, wanted: &str) -> Option<usize> {
    let wanted = wanted.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }
    let enabled = || {
        select
            .options
            .iter()
            .enumerate()
            .filter(|(_, option)| !option.disabled)
    };
    enabled()
        .find(|(_, o)| o.text.trim().to_lowercase() == wanted)
        .or_else(|| enabled().find(|(_, o)| o.value.trim().to_lowercase() == wanted))
        .or_else(|| enabled().find(|(_, o)| o.text.to_lowercase().contains(&wanted)))
        .map(|(index, _)| index)
}

/// Group member for `value`. Text picks the member named by it, then the
/// member that reads as the same yes/no answer. A boolean picks the member
/// reading as that answer; `true` also checks a lone radio.
fn choose_radio(
    group: &[RadioOption],
    target: ElementRef,
    label: &str,
    value: &Scalar,
) -> Option<ElementRef> {
    let enabled = || group.iter().filter(|option| !option.disabled);
    let answering = |answer: bool| {
        enabled()
            .find(|option| {
                option
                    .names
                    .iter()
                    .any(|name| Scalar::Text(name.clone()).as_bool() == Some(answer))
            })
            .map(|option| option.element)
    };

    if let Scalar::Bool(answer) = value {
        let lone = *answer && group.len() == 1;
        return answering(*answer).or_else(|| lone.then_some(target));
    }

    let wanted = normalize(&value.to_string());
    if wanted.is_empty() {
        return None;
    }
    enabled()
        .find(|option| {
            option.names.contains(&wanted) || (option.element == target && label == wanted)
        })
        .map(|option| option.element)
        .or_else(|| answering(value.as_bool()?))
}

#[cfg(test)]
#[path = "filler_tests.rs"]
mod tests;
