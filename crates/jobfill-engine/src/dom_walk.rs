//! Small read helpers shared by the scanner and the navigator.

use jobfill_protocols::{Document, ElementRef, ElementSnapshot, NodeSnapshot};

pub(crate) fn element(doc: &dyn Document, node: ElementRef) -> Option<ElementSnapshot> {
    match doc.node(node)? {
        NodeSnapshot::Element(e) => Some(e),
        NodeSnapshot::Text(_) => None,
    }
}

/// Subtrees that never render text or controls.
pub(crate) fn is_inert(tag: &str) -> bool {
    matches!(tag, "script" | "style" | "template" | "noscript" | "head")
}

/// Rendered text of a subtree, whitespace collapsed.
pub(crate) fn text_content(doc: &dyn Document, node: ElementRef) -> String {
    let mut parts = Vec::new();
    collect_text(doc, node, &mut parts);
    parts.join(" ")
}

fn collect_text(doc: &dyn Document, node: ElementRef, parts: &mut Vec<String>) {
    match doc.node(node) {
        Some(NodeSnapshot::Text(text)) => {
            parts.extend(text.split_whitespace().map(str::to_string));
        }
        Some(NodeSnapshot::Element(e)) if !is_inert(&e.tag) => {
            for child in doc.children(node) {
                collect_text(doc, child, parts);
            }
        }
        _ => {}
    }
}
