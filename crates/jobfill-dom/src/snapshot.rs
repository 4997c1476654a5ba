//! Serializable page descriptions.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;

/// A page: its URL and the root node of its document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub url: String,
    pub root: NodeSpec,
}

impl PageSnapshot {
    pub fn new(url: impl Into<String>, root: impl Into<NodeSpec>) -> Self {
        Self {
            url: url.into(),
            root: root.into(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: PageSnapshot = serde_json::from_str(json)?;
        if !matches!(snapshot.root, NodeSpec::Element(_)) {
            return Err(SnapshotError::Invalid("root must be an element".to_string()));
        }
        Ok(snapshot)
    }

    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

/// A node: plain string for text, object for elements.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeSpec {
    Text(String),
    Element(ElementSpec),
}

impl From<ElementSpec> for NodeSpec {
    fn from(spec: ElementSpec) -> Self {
        NodeSpec::Element(spec)
    }
}

impl From<&str> for NodeSpec {
    fn from(text: &str) -> Self {
        NodeSpec::Text(text.to_string())
    }
}

/// An element with attributes and children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementSpec {
    pub tag: String,

    #[serde(default)]
    pub attrs: BTreeMap<String, String>,

    #[serde(default)]
    pub children: Vec<NodeSpec>,

    /// Owned by a page framework: programmatic writes do not stick.
    #[serde(default)]
    pub controlled: bool,

    /// Embedded document of an `iframe`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<FrameSpec>,
}

/// Embedded frame document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSpec {
    #[serde(default = "default_same_origin")]
    pub same_origin: bool,
    pub document: Box<NodeSpec>,
}

fn default_same_origin() -> bool {
    true
}

/// Start an element spec.
pub fn el(tag: &str) -> ElementSpec {
    ElementSpec {
        tag: tag.to_lowercase(),
        attrs: BTreeMap::new(),
        children: Vec::new(),
        controlled: false,
        frame: None,
    }
}

impl ElementSpec {
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_lowercase(), value.to_string());
        self
    }

    pub fn child(mut self, child: impl Into<NodeSpec>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn text(self, text: &str) -> Self {
        self.child(NodeSpec::Text(text.to_string()))
    }

    pub fn controlled(mut self) -> Self {
        self.controlled = true;
        self
    }

    pub fn frame(mut self, document: impl Into<NodeSpec>, same_origin: bool) -> Self {
        self.frame = Some(FrameSpec {
            same_origin,
            document: Box::new(document.into()),
        });
        self
    }
}
