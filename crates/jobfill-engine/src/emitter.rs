//! Framework-visible input events.
//!
//! Page frameworks track their own copy of a control's value and only pick
//! up a change when they see the events a user edit produces. After every
//! programmatic write the engine fires "value changed" then "commit", both
//! bubbling so listeners bound on ancestors observe them.

use tracing::debug;

use jobfill_protocols::{Document, ElementRef, EventKind, SyntheticEvent};

use crate::capability::Capability;

/// Registry name of the input-signal capability.
pub const DISPATCH_INPUT_EVENTS: &str = "dispatchInputEvents";

/// Result of firing an input signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// The element left the document; nothing was dispatched.
    Detached,
}

/// Notifies a page that a control's value changed.
pub trait InputSignal: Capability {
    /// Fire the signal once for one write. Never fails: a detached element
    /// is reported as [`Delivery::Detached`].
    fn fire_input_signal(&self, doc: &dyn Document, element: ElementRef) -> Delivery;
}

/// Default [`InputSignal`]: bubbling `input` then bubbling `change`.
#[derive(Debug, Default, Clone)]
pub struct EventEmitter;

impl EventEmitter {
    pub fn new() -> Self {
        Self
    }
}

impl Capability for EventEmitter {
    fn capability_id(&self) -> &str {
        DISPATCH_INPUT_EVENTS
    }
}

impl InputSignal for EventEmitter {
    fn fire_input_signal(&self, doc: &dyn Document, element: ElementRef) -> Delivery {
        for kind in [EventKind::Input, EventKind::Change] {
            match doc.dispatch(element, SyntheticEvent::bubbling(kind)) {
                Ok(()) => {}
                Err(e) => {
                    debug!(event = kind.as_str(), error = %e, "Input signal not delivered");
                    return Delivery::Detached;
                }
            }
        }
        Delivery::Delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobfill_dom::{el, MemoryDocument, PageSnapshot};

    fn page() -> MemoryDocument {
        MemoryDocument::new(&PageSnapshot::new(
            "https://x.test",
            el("form")
                .attr("id", "form")
                .child(el("input").attr("id", "name")),
        ))
    }

    #[test]
    fn test_fires_input_then_change() {
        let doc = page();
        let input = doc.find_by_id("name").unwrap();

        let delivery = EventEmitter::new().fire_input_signal(&doc, input);

        assert_eq!(delivery, Delivery::Delivered);
        assert_eq!(
            doc.dispatched_events(),
            vec![(input, EventKind::Input), (input, EventKind::Change)]
        );
    }

    #[test]
    fn test_ancestor_listener_observes_both() {
        let doc = page();
        let form = doc.find_by_id("form").unwrap();
        let input = doc.find_by_id("name").unwrap();
        doc.listen(form, EventKind::Input);
        doc.listen(form, EventKind::Change);

        EventEmitter::new().fire_input_signal(&doc, input);

        let kinds: Vec<EventKind> = doc.delivered_events().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EventKind::Input, EventKind::Change]);
    }

    #[test]
    fn test_detached_is_noop() {
        let doc = page();
        let input = doc.find_by_id("name").unwrap();
        doc.detach(input).unwrap();

        let delivery = EventEmitter::new().fire_input_signal(&doc, input);

        assert_eq!(delivery, Delivery::Detached);
        assert!(doc.dispatched_events().is_empty());
    }

    #[test]
    fn test_capability_name() {
        assert_eq!(EventEmitter::new().capability_id(), "dispatchInputEvents");
    }
}
