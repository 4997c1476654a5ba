//! Field descriptors, match results, fill plans and outcomes.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::document::ElementRef;
use crate::profile::Scalar;

/// Kind of form control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Text,
    Select,
    Checkbox,
    Radio,
    Textarea,
    File,
}

/// Semantic type of a value, used by the inferred matching layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    Text,
    Email,
    Phone,
    Url,
    Number,
    Date,
    Boolean,
    Document,
}

/// Value or state of a control at scan time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum CurrentValue {
    Text(String),
    Checked(bool),
    Selected(Option<String>),
    Empty,
}

/// One discovered input on the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    /// Valid only for the page instance that produced it.
    #[serde(skip)]
    pub element: ElementRef,
    /// Position in document order (frames are walked in place).
    pub order: usize,
    /// Normalized label.
    pub label: String,
    pub kind: InputKind,
    pub current_value: CurrentValue,
    pub required: bool,
    pub visible: bool,
    pub disabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_hint: Option<SemanticType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_id: Option<String>,
    /// Option texts of a select.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl FieldDescriptor {
    /// Equality ignoring element identity.
    pub fn same_shape(&self, other: &FieldDescriptor) -> bool {
        self.order == other.order
            && self.label == other.label
            && self.kind == other.kind
            && self.current_value == other.current_value
            && self.required == other.required
            && self.visible == other.visible
            && self.disabled == other.disabled
            && self.semantic_hint == other.semantic_hint
            && self.name == other.name
            && self.html_id == other.html_id
            && self.options == other.options
    }
}

/// Strength of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Exact,
    Fuzzy,
    Inferred,
    Unmatched,
}

/// Mapping of one descriptor to a profile key.
///
/// `profile_key` is `None` exactly when `confidence` is `Unmatched`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub descriptor: FieldDescriptor,
    pub profile_key: Option<String>,
    pub confidence: Confidence,
    /// Scalar assigned to this field; the n-th element for repeatable keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Scalar>,
    pub score: f64,
}

impl MatchResult {
    pub fn unmatched(descriptor: FieldDescriptor) -> Self {
        Self {
            descriptor,
            profile_key: None,
            confidence: Confidence::Unmatched,
            value: None,
            score: 0.0,
        }
    }

    pub fn matched(
        descriptor: FieldDescriptor,
        profile_key: impl Into<String>,
        confidence: Confidence,
        value: Scalar,
        score: f64,
    ) -> Self {
        debug_assert!(confidence != Confidence::Unmatched);
        Self {
            descriptor,
            profile_key: Some(profile_key.into()),
            confidence,
            value: Some(value),
            score,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.profile_key.is_some()
    }
}

/// Ordered fill assignments, in document order, one per descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FillPlan {
    entries: Vec<MatchResult>,
}

impl FillPlan {
    /// Keep matched results, drop duplicate descriptors (first wins), sort by
    /// document order.
    pub fn from_results<I>(results: I) -> Self
    where
        I: IntoIterator<Item = MatchResult>,
    {
        let mut seen: HashSet<ElementRef> = HashSet::new();
        let mut entries: Vec<MatchResult> = results
            .into_iter()
            .filter(|r| r.is_matched())
            .filter(|r| seen.insert(r.descriptor.element))
            .collect();
        entries.sort_by_key(|r| r.descriptor.order);
        Self { entries }
    }

    pub fn entries(&self) -> &[MatchResult] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &MatchResult> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result status of one plan entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FillStatus {
    Written,
    /// Invisible, disabled or file inputs; never attempted.
    SkippedInvisible,
    SkippedDetached,
    /// Select without an option matching the value.
    SkippedNoOption,
    /// The write did not stick, usually a framework-controlled input.
    VerifyFailed,
}

/// Outcome of one plan entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FillOutcome {
    pub result: MatchResult,
    pub status: FillStatus,
}

#[cfg(test)]
#[path = "field_tests.rs"]
mod tests;
