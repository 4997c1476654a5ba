//! Form field discovery.
//!
//! One scan walks every node under the root once to index labels, then once
//! more to emit descriptors. Frames are scanned in place, each with its own
//! label index since ids are scoped to a document.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use jobfill_protocols::{
    CurrentValue, Document, ElementRef, ElementSnapshot, FieldDescriptor, InputKind,
    NodeSnapshot, SemanticType,
};

use crate::dom_walk::is_inert;
use crate::matcher::normalize::{normalize, normalize_identifier};

/// Elements that delimit a logical group for "nearest preceding text".
const GROUP_TAGS: &[&str] = &[
    "html", "body", "main", "form", "fieldset", "div", "section", "article", "aside", "header",
    "footer", "nav", "ul", "ol", "li", "dl", "dd", "table", "thead", "tbody", "tr", "td", "th",
];

/// Elements whose own text is never a label for something else.
const TEXTLESS_TAGS: &[&str] = &["select", "option", "optgroup", "textarea", "button"];

/// Stateless field scanner.
#[derive(Debug, Default, Clone)]
pub struct FieldScanner;

impl FieldScanner {
    pub fn new() -> Self {
        Self
    }

    /// Descriptors for every form control reachable from `root`, in document
    /// order.
    pub fn scan(&self, doc: &dyn Document, root: ElementRef) -> Vec<FieldDescriptor> {
        let mut walk = Walk {
            doc,
            fields: Vec::new(),
            groups: Vec::new(),
        };
        walk.scope(root, true);
        debug!(
            fields = walk.fields.len(),
            visible = walk.fields.iter().filter(|f| f.visible).count(),
            "Scanned page"
        );
        walk.fields
    }
}

/// Labels of one document scope.
#[derive(Default)]
struct LabelIndex {
    /// Text of the first `<label for=id>` per id.
    by_for: HashMap<String, String>,
    /// Text content per element id, for `aria-labelledby`.
    by_id: HashMap<String, String>,
    /// Text of every label element.
    label_text: HashMap<ElementRef, String>,
    /// Labels bound to a control (by `for` or by wrapping one).
    bound: HashSet<ElementRef>,
}

impl LabelIndex {
    fn build(doc: &dyn Document, root: ElementRef) -> Self {
        let mut index = Self::default();
        let mut words = Vec::new();
        index.visit(doc, root, &mut words);
        index
    }

    /// Index labels under `node`. Words of the subtree's text are appended
    /// to `words`; the return value says whether the subtree holds a control.
    fn visit(&mut self, doc: &dyn Document, node: ElementRef, words: &mut Vec<String>) -> bool {
        let e = match doc.node(node) {
            Some(NodeSnapshot::Text(text)) => {
                words.extend(text.split_whitespace().map(str::to_string));
                return false;
            }
            Some(NodeSnapshot::Element(e)) if !is_inert(&e.tag) => e,
            _ => return false,
        };

        let start = words.len();
        let mut has_control = field_kind(&e).is_some();
        for child in doc.children(node) {
            has_control |= self.visit(doc, child, words);
        }
        if TEXTLESS_TAGS.contains(&e.tag.as_str()) {
            words.truncate(start);
        }

        let id = e.attr("id");
        if e.tag != "label" && id.is_none() {
            return has_control;
        }
        let text = words[start..].join(" ");
        if e.tag == "label" {
            if let Some(target) = e.attr("for") {
                self.by_for
                    .entry(target.to_string())
                    .or_insert_with(|| text.clone());
                self.bound.insert(node);
            }
            if has_control {
                self.bound.insert(node);
            }
            self.label_text.insert(node, text.clone());
        }
        if let Some(id) = id {
            self.by_id.entry(id.to_string()).or_insert(text);
        }
        has_control
    }
}

#[derive(Clone, Default)]
struct Context {
    visible: bool,
    /// Text of the label element wrapping the current node.
    wrapping_label: Option<String>,
    /// Text here is not a candidate "preceding text".
    suppress_text: bool,
}

struct Walk<'a> {
    doc: &'a dyn Document,
    fields: Vec<FieldDescriptor>,
    /// One slot per open group element: the latest text seen in it.
    groups: Vec<Option<String>>,
}

impl Walk<'_> {
    fn scope(&mut self, root: ElementRef, visible: bool) {
        let index = LabelIndex::build(self.doc, root);
        let outer_groups = std::mem::take(&mut self.groups);
        self.groups.push(None);
        let ctx = Context {
            visible,
            ..Context::default()
        };
        self.visit(root, &index, &ctx);
        self.groups = outer_groups;
    }

    fn visit(&mut self, node: ElementRef, index: &LabelIndex, ctx: &Context) {
        let e = match self.doc.node(node) {
            Some(NodeSnapshot::Text(text)) => {
                if !ctx.suppress_text {
                    self.record_text(&text);
                }
                return;
            }
            Some(NodeSnapshot::Element(e)) if !is_inert(&e.tag) => e,
            _ => return,
        };

        let visible = ctx.visible && !e.hidden;

        if let Some((kind, hint)) = field_kind(&e) {
            let descriptor = self.describe(node, &e, kind, hint, visible, index, ctx);
            self.fields.push(descriptor);
            return;
        }

        if e.tag == "iframe" || e.tag == "frame" {
            if let Some(frame_root) = self.doc.frame_root(node) {
                self.scope(frame_root, visible);
            }
            return;
        }

        let mut child_ctx = Context {
            visible,
            wrapping_label: ctx.wrapping_label.clone(),
            suppress_text: ctx.suppress_text || TEXTLESS_TAGS.contains(&e.tag.as_str()),
        };
        if e.tag == "label" {
            child_ctx.wrapping_label = index.label_text.get(&node).cloned();
            child_ctx.suppress_text |= index.bound.contains(&node);
        }

        let group = GROUP_TAGS.contains(&e.tag.as_str());
        if group {
            self.groups.push(None);
        }
        for child in self.doc.children(node) {
            self.visit(child, index, &child_ctx);
        }
        if group {
            self.groups.pop();
        }
    }

    fn record_text(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if let Some(slot) = self.groups.last_mut() {
            *slot = Some(text.to_string());
        }
    }

    /// Nearest text before the current field within its enclosing groups.
    /// Consumed, so it labels at most one field.
    fn take_preceding_text(&mut self) -> Option<String> {
        self.groups.iter_mut().rev().find_map(Option::take)
    }

    #[allow(clippy::too_many_arguments)]
    fn describe(
        &mut self,
        node: ElementRef,
        e: &ElementSnapshot,
        kind: InputKind,
        semantic_hint: Option<SemanticType>,
        visible: bool,
        index: &LabelIndex,
        ctx: &Context,
    ) -> FieldDescriptor {
        let preceding = self.take_preceding_text();
        let disabled = e.is_disabled();

        let labelled_by = e.attr("aria-labelledby").map(|ids| {
            ids.split_whitespace()
                .filter_map(|id| index.by_id.get(id).cloned())
                .collect::<Vec<_>>()
                .join(" ")
        });
        let label = [
            e.attr("id").and_then(|id| index.by_for.get(id)).cloned(),
            ctx.wrapping_label.clone(),
            e.attr("aria-label").map(str::to_string),
            labelled_by,
            e.attr("placeholder").map(str::to_string),
            preceding,
        ]
        .into_iter()
        .flatten()
        .map(|text| normalize(&text))
        .find(|text| !text.is_empty())
        .or_else(|| {
            [e.attr("name"), e.attr("id")]
                .into_iter()
                .flatten()
                .map(normalize_identifier)
                .find(|text| !text.is_empty())
        })
        .unwrap_or_default();

        FieldDescriptor {
            element: node,
            order: self.fields.len(),
            label,
            kind,
            current_value: current_value(e, kind),
            required: e.has_attr("required")
                || e
                    .attr("aria-required")
                    .is_some_and(|v| v.eq_ignore_ascii_case("true")),
            visible: visible && !disabled,
            disabled,
            semantic_hint,
            name: e.attr("name").map(str::to_string),
            html_id: e.attr("id").map(str::to_string),
            options: e.options.iter().map(|o| o.text.clone()).collect(),
        }
    }
}

/// Kind and type hint of a form control; `None` for everything else,
/// including buttons and hidden inputs.
fn field_kind(e: &ElementSnapshot) -> Option<(InputKind, Option<SemanticType>)> {
    match e.tag.as_str() {
        "select" => Some((InputKind::Select, None)),
        "textarea" => Some((InputKind::Textarea, None)),
        "input" => match e.input_type().as_str() {
            "hidden" | "submit" | "reset" | "image" | "button" => None,
            "checkbox" => Some((InputKind::Checkbox, None)),
            "radio" => Some((InputKind::Radio, None)),
            "file" => Some((InputKind::File, None)),
            "email" => Some((InputKind::Text, Some(SemanticType::Email))),
            "tel" => Some((InputKind::Text, Some(SemanticType::Phone))),
            "url" => Some((InputKind::Text, Some(SemanticType::Url))),
            "number" | "range" => Some((InputKind::Text, Some(SemanticType::Number))),
            "date" | "month" | "week" | "datetime-local" => {
                Some((InputKind::Text, Some(SemanticType::Date)))
            }
            _ => Some((InputKind::Text, None)),
        },
        _ => None,
    }
}

fn current_value(e: &ElementSnapshot, kind: InputKind) -> CurrentValue {
    match kind {
        InputKind::Checkbox | InputKind::Radio => CurrentValue::Checked(e.checked),
        InputKind::Select => CurrentValue::Selected(e.selected_option().map(|o| o.text.clone())),
        _ if e.value.is_empty() => CurrentValue::Empty,
        _ => CurrentValue::Text(e.value.clone()),
    }
}

#[cfg(test)]
#[path = "scanner_tests.rs"]
mod tests;
