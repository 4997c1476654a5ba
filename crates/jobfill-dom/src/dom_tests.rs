use super::*;
use jobfill_protocols::{Document, DomError, EventKind, NodeSnapshot, SyntheticEvent};

fn form_page() -> PageSnapshot {
    PageSnapshot::new(
        "https://jobs.example.com/apply",
        el("html").child(
            el("body").child(
                el("form")
                    .attr("id", "form")
                    .child(el("label").attr("for", "email").text("Email"))
                    .child(el("input").attr("id", "email").attr("type", "email"))
                    .child(el("input").attr("id", "prefilled").attr("value", "hello"))
                    .child(
                        el("select")
                            .attr("id", "country")
                            .child(el("option").attr("value", "").text("Select..."))
                            .child(el("option").attr("value", "us").text("USA"))
                            .child(el("option").text("Canada")),
                    )
                    .child(el("textarea").attr("id", "bio").text("  about me "))
                    .child(el("input").attr("id", "ghost").attr("style", "display: none"))
                    .child(el("input").attr("id", "locked").controlled()),
            ),
        ),
    )
}

fn element(doc: &MemoryDocument, id: &str) -> jobfill_protocols::ElementSnapshot {
    let node = doc.find_by_id(id).unwrap();
    match doc.node(node).unwrap() {
        NodeSnapshot::Element(e) => e,
        NodeSnapshot::Text(_) => panic!("expected element"),
    }
}

#[test]
fn test_initial_form_state() {
    let doc = MemoryDocument::new(&form_page());

    assert_eq!(element(&doc, "prefilled").value, "hello");
    assert_eq!(element(&doc, "email").value, "");
    assert_eq!(element(&doc, "bio").value, "about me");

    let country = element(&doc, "country");
    assert_eq!(country.options.len(), 3);
    assert_eq!(country.options[1].text, "USA");
    assert_eq!(country.options[1].value, "us");
    assert_eq!(country.options[2].value, "Canada");
    assert_eq!(country.selected_index, Some(0));
}

#[test]
fn test_own_style_hidden() {
    let doc = MemoryDocument::new(&form_page());
    assert!(element(&doc, "ghost").hidden);
    assert!(!element(&doc, "email").hidden);
}

#[test]
fn test_set_value_and_select() {
    let doc = MemoryDocument::new(&form_page());
    let email = doc.find_by_id("email").unwrap();
    doc.set_value(email, "a@b.co").unwrap();
    assert_eq!(element(&doc, "email").value, "a@b.co");

    let country = doc.find_by_id("country").unwrap();
    doc.select_index(country, 1).unwrap();
    let snapshot = element(&doc, "country");
    assert_eq!(snapshot.selected_index, Some(1));
    assert_eq!(snapshot.value, "us");

    let err = doc.select_index(country, 9).unwrap_err();
    assert_eq!(err, DomError::OptionOutOfRange { index: 9, len: 3 });
}

#[test]
fn test_controlled_input_drops_writes() {
    let doc = MemoryDocument::new(&form_page());
    let locked = doc.find_by_id("locked").unwrap();
    doc.set_value(locked, "typed").unwrap();
    assert_eq!(element(&doc, "locked").value, "");
}

#[test]
fn test_set_value_on_div_unsupported() {
    let doc = MemoryDocument::new(&form_page());
    let form = doc.find_by_id("form").unwrap();
    assert!(matches!(
        doc.set_value(form, "x"),
        Err(DomError::Unsupported(_))
    ));
}

#[test]
fn test_detach_invalidates_handle() {
    let doc = MemoryDocument::new(&form_page());
    let email = doc.find_by_id("email").unwrap();
    doc.detach(email).unwrap();

    assert!(!doc.is_attached(email));
    assert_eq!(doc.set_value(email, "x"), Err(DomError::Detached));
    assert_eq!(
        doc.dispatch(email, SyntheticEvent::bubbling(EventKind::Input)),
        Err(DomError::Detached)
    );
}

#[test]
fn test_navigate_invalidates_old_handles() {
    let doc = MemoryDocument::new(&form_page());
    let before = doc.page();
    let email = doc.find_by_id("email").unwrap();

    doc.navigate(&form_page());

    assert_ne!(doc.page().id, before.id);
    assert!(!doc.is_attached(email));
    assert!(doc.node(email).is_none());
    assert!(doc.find_by_id("email").is_some());
}

#[test]
fn test_handles_rejected_across_documents() {
    let first = MemoryDocument::new(&form_page());
    let second = MemoryDocument::new(&form_page());
    let email = first.find_by_id("email").unwrap();
    assert!(!second.is_attached(email));
}

#[test]
fn test_events_bubble_to_ancestor_listeners() {
    let doc = MemoryDocument::new(&form_page());
    let form = doc.find_by_id("form").unwrap();
    let email = doc.find_by_id("email").unwrap();
    doc.listen(form, EventKind::Input);

    doc.dispatch(email, SyntheticEvent::bubbling(EventKind::Input))
        .unwrap();
    doc.dispatch(email, SyntheticEvent::bubbling(EventKind::Change))
        .unwrap();
    doc.dispatch(
        email,
        SyntheticEvent {
            kind: EventKind::Input,
            bubbles: false,
        },
    )
    .unwrap();

    let delivered = doc.delivered_events();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].listener, form);
    assert_eq!(delivered[0].target, email);
    assert_eq!(doc.dispatched_events().len(), 3);
}

#[test]
fn test_radio_group_exclusive() {
    let page = PageSnapshot::new(
        "https://x.test",
        el("form")
            .child(
                el("input")
                    .attr("type", "radio")
                    .attr("name", "auth")
                    .attr("id", "yes")
                    .attr("checked", ""),
            )
            .child(
                el("input")
                    .attr("type", "radio")
                    .attr("name", "auth")
                    .attr("id", "no"),
            ),
    );
    let doc = MemoryDocument::new(&page);
    assert!(element(&doc, "yes").checked);

    doc.set_checked(doc.find_by_id("no").unwrap(), true).unwrap();
    assert!(element(&doc, "no").checked);
    assert!(!element(&doc, "yes").checked);
}

#[test]
fn test_same_origin_frame_exposed() {
    let page = PageSnapshot::new(
        "https://x.test",
        el("body")
            .child(el("iframe").attr("id", "inner").frame(
                el("html").child(el("input").attr("id", "framed")),
                true,
            ))
            .child(el("iframe").attr("id", "foreign").frame(
                el("html").child(el("input").attr("id", "blocked")),
                false,
            )),
    );
    let doc = MemoryDocument::new(&page);

    let inner = doc.find_by_id("inner").unwrap();
    assert!(doc.frame_root(inner).is_some());
    let framed = doc.find_by_id("framed").unwrap();
    assert!(doc.is_attached(framed));

    let foreign = doc.find_by_id("foreign").unwrap();
    assert!(doc.frame_root(foreign).is_none());
    assert!(doc.find_by_id("blocked").is_none());
}

#[test]
fn test_click_navigation_replaces_page() {
    let page = PageSnapshot::new(
        "https://x.test/1",
        el("body").child(el("button").attr("id", "next").text("Next")),
    );
    let doc = MemoryDocument::new(&page);
    let next = doc.find_by_text("button", "Next").unwrap();
    doc.navigate_on_click(
        next,
        PageSnapshot::new("https://x.test/2", el("body").text("done")),
    );

    doc.click(next).unwrap();

    assert_eq!(doc.page().url, "https://x.test/2");
    assert!(!doc.is_attached(next));
}

#[test]
fn test_snapshot_from_json() {
    let json = r#"{
        "url": "https://x.test",
        "root": {
            "tag": "form",
            "children": [
                {"tag": "label", "attrs": {"for": "n"}, "children": ["Name"]},
                {"tag": "input", "attrs": {"id": "n"}, "controlled": true}
            ]
        }
    }"#;
    let snapshot = PageSnapshot::from_json(json).unwrap();
    let doc = MemoryDocument::new(&snapshot);
    assert!(doc.find_by_id("n").is_some());
    assert_eq!(doc.page().url, "https://x.test");
}

#[test]
fn test_snapshot_rejects_text_root() {
    let err = PageSnapshot::from_json(r#"{"url": "u", "root": "just text"}"#).unwrap_err();
    assert!(matches!(err, SnapshotError::Invalid(_)));
}

#[test]
fn test_snapshot_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = PageSnapshot::load(&dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, SnapshotError::Io(_)));
}

#[tokio::test]
async fn test_mutations_counted_but_value_writes_are_not() {
    let doc = MemoryDocument::new(&form_page());
    let mut rx = doc.mutations();
    let email = doc.find_by_id("email").unwrap();

    doc.set_value(email, "x").unwrap();
    assert!(!rx.has_changed().unwrap());

    let form = doc.find_by_id("form").unwrap();
    doc.append(form, el("button").text("Next")).unwrap();
    assert!(rx.has_changed().unwrap());
    rx.changed().await.unwrap();
    assert_eq!(*rx.borrow(), 1);
}
