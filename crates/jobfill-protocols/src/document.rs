//! Host document protocol.
//!
//! The engine never owns page nodes. It talks to the live page through the
//! [`Document`] trait using [`ElementRef`] handles that are only meaningful
//! for the page instance that issued them.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tokio::sync::watch;

use crate::error::DomError;

/// Identity of one page instance (one loaded document).
///
/// A new id is issued on every full navigation or document replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PageId(pub u64);

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page-{}", self.0)
    }
}

/// URL plus document identity of the current page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageInstance {
    pub id: PageId,
    pub url: String,
}

/// Weak handle to a node of a live document.
///
/// Carries no ownership and is deliberately not serializable. Documents
/// reject handles whose page id differs from the current page, so every
/// handle is invalidated wholesale on navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementRef {
    page: PageId,
    node: usize,
}

impl ElementRef {
    pub fn new(page: PageId, node: usize) -> Self {
        Self { page, node }
    }

    pub fn page(&self) -> PageId {
        self.page
    }

    pub fn node(&self) -> usize {
        self.node
    }
}

/// An `<option>` of a select element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub text: String,
    pub value: String,
    pub disabled: bool,
}

/// Point-in-time view of an element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementSnapshot {
    /// Lowercase tag name.
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    /// Current value property (not the `value` attribute).
    pub value: String,
    pub checked: bool,
    pub options: Vec<SelectOption>,
    pub selected_index: Option<usize>,
    /// Hidden by the element's own computed style. Visibility inherited from
    /// ancestors is resolved by the caller while walking.
    pub hidden: bool,
}

impl ElementSnapshot {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Lowercased `type` attribute of an input, `text` when absent.
    pub fn input_type(&self) -> String {
        self.attr("type")
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "text".to_string())
    }

    pub fn is_disabled(&self) -> bool {
        self.has_attr("disabled")
            || self
                .attr("aria-disabled")
                .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    pub fn selected_option(&self) -> Option<&SelectOption> {
        self.selected_index.and_then(|i| self.options.get(i))
    }
}

/// Point-in-time view of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeSnapshot {
    Element(ElementSnapshot),
    Text(String),
}

/// Synthetic event types the engine dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// "value changed"
    Input,
    /// "commit"
    Change,
    Click,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Input => "input",
            EventKind::Change => "change",
            EventKind::Click => "click",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticEvent {
    pub kind: EventKind,
    pub bubbles: bool,
}

impl SyntheticEvent {
    pub fn bubbling(kind: EventKind) -> Self {
        Self { kind, bubbles: true }
    }
}

/// Read/write surface of a live host page.
///
/// Methods take `&self`: implementations wrap a host that mutates under
/// them (the page's own scripts) and use interior mutability. Every method
/// must tolerate stale handles; reads return `None`/empty and writes return
/// [`DomError::Detached`].
pub trait Document: Send + Sync {
    /// The page instance currently loaded.
    fn page(&self) -> PageInstance;

    /// Top-level document root.
    fn root(&self) -> ElementRef;

    fn node(&self, node: ElementRef) -> Option<NodeSnapshot>;

    fn children(&self, node: ElementRef) -> Vec<ElementRef>;

    /// Root of the embedded document of a frame element, when it is
    /// same-origin and accessible.
    fn frame_root(&self, _frame: ElementRef) -> Option<ElementRef> {
        None
    }

    fn is_attached(&self, node: ElementRef) -> bool;

    fn set_value(&self, node: ElementRef, value: &str) -> Result<(), DomError>;

    fn set_checked(&self, node: ElementRef, checked: bool) -> Result<(), DomError>;

    fn select_index(&self, node: ElementRef, index: usize) -> Result<(), DomError>;

    fn dispatch(&self, node: ElementRef, event: SyntheticEvent) -> Result<(), DomError>;

    fn click(&self, node: ElementRef) -> Result<(), DomError>;

    /// Counter bumped on every DOM mutation of the current page.
    fn mutations(&self) -> watch::Receiver<u64>;
}
