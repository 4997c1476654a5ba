//! Radio group resolution.
//!
//! A group is every radio sharing the target's `name` inside the same form,
//! or inside the same document when the radio is not in a form. Each member
//! is known by its value, its aria label, its `<label>` (by `for` or
//! wrapping) and the text right after it.

use std::collections::HashMap;

use jobfill_protocols::{Document, ElementRef, NodeSnapshot};

use crate::dom_walk::{is_inert, text_content};
use crate::matcher::normalize::normalize;

#[derive(Debug)]
pub(crate) struct RadioOption {
    pub element: ElementRef,
    /// Normalized names the option answers to.
    pub names: Vec<String>,
    pub disabled: bool,
}

#[derive(Debug)]
struct Found {
    element: ElementRef,
    name: String,
    document: ElementRef,
    form: Option<ElementRef>,
    names: Vec<String>,
    disabled: bool,
    html_id: Option<String>,
}

#[derive(Default)]
struct Walk {
    radios: Vec<Found>,
    /// `(document root, for)` to label text.
    labels: HashMap<(ElementRef, String), String>,
}

/// Members of `target`'s group in document order. A radio without a name
/// is a group of one.
pub(crate) fn radio_group(doc: &dyn Document, target: ElementRef) -> Vec<RadioOption> {
    let mut walk = Walk::default();
    let root = doc.root();
    walk.visit(doc, root, root, None, None);

    let Some(anchor) = walk.radios.iter().find(|r| r.element == target) else {
        return Vec::new();
    };
    let (document, form, name) = (anchor.document, anchor.form, anchor.name.clone());

    let Walk { radios, labels } = walk;
    radios
        .into_iter()
        .filter(|r| {
            r.element == target
                || (!name.is_empty()
                    && r.name == name
                    && r.document == document
                    && r.form == form)
        })
        .map(|mut r| {
            if let Some(text) = r
                .html_id
                .as_ref()
                .and_then(|id| labels.get(&(r.document, id.clone())))
            {
                push_name(&mut r.names, text);
            }
            RadioOption {
                element: r.element,
                names: r.names,
                disabled: r.disabled,
            }
        })
        .collect()
}

impl Walk {
    fn visit(
        &mut self,
        doc: &dyn Document,
        node: ElementRef,
        document: ElementRef,
        form: Option<ElementRef>,
        label: Option<&str>,
    ) {
        let Some(NodeSnapshot::Element(e)) = doc.node(node) else {
            return;
        };
        if is_inert(&e.tag) {
            return;
        }

        if let Some(root) = doc.frame_root(node) {
            self.visit(doc, root, root, None, None);
            return;
        }

        let form = if e.tag == "form" { Some(node) } else { form };
        let own_label;
        let label = if e.tag == "label" {
            own_label = text_content(doc, node);
            if let Some(target) = e.attr("for") {
                self.labels
                    .insert((document, target.to_string()), own_label.clone());
            }
            Some(own_label.as_str())
        } else {
            label
        };

        if e.tag == "input"
            && e
                .attr("type")
                .is_some_and(|t| t.trim().eq_ignore_ascii_case("radio"))
        {
            let mut names = Vec::new();
            for text in [e.attr("value"), e.attr("aria-label"), label]
                .into_iter()
                .flatten()
            {
                push_name(&mut names, text);
            }
            self.radios.push(Found {
                element: node,
                name: e.attr("name").unwrap_or_default().trim().to_string(),
                document,
                form,
                names,
                disabled: e.is_disabled(),
                html_id: e.attr("id").map(str::to_string),
            });
            return;
        }

        let children = doc.children(node);
        for (i, child) in children.iter().enumerate() {
            self.visit(doc, *child, document, form, label);
            let radio_here = self.radios.last().is_some_and(|r| r.element == *child);
            if !radio_here {
                continue;
            }
            let following = children.get(i + 1).and_then(|n| doc.node(*n));
            if let Some(NodeSnapshot::Text(text)) = following {
                if let Some(last) = self.radios.last_mut() {
                    push_name(&mut last.names, &text);
                }
            }
        }
    }
}

fn push_name(names: &mut Vec<String>, text: &str) {
    let name = normalize(text);
    if !name.is_empty() && !names.contains(&name) {
        names.push(name);
    }
}
