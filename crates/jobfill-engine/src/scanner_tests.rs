use super::*;
use jobfill_dom::{el, ElementSpec, MemoryDocument, PageSnapshot};

fn doc(body: ElementSpec) -> MemoryDocument {
    MemoryDocument::new(&PageSnapshot::new(
        "https://jobs.example.com/apply",
        el("html").child(el("body").child(body)),
    ))
}

fn scan(doc: &MemoryDocument) -> Vec<FieldDescriptor> {
    FieldScanner::new().scan(doc, doc.root())
}

fn labels(fields: &[FieldDescriptor]) -> Vec<&str> {
    fields.iter().map(|f| f.label.as_str()).collect()
}

#[test]
fn test_label_for_association() {
    let doc = doc(el("form")
        .child(el("label").attr("for", "fn").text("First Name *"))
        .child(el("input").attr("id", "fn").attr("required", "")));

    let fields = scan(&doc);

    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].label, "first name");
    assert!(fields[0].required);
    assert!(fields[0].visible);
    assert_eq!(fields[0].kind, InputKind::Text);
    assert_eq!(fields[0].current_value, CurrentValue::Empty);
}

#[test]
fn test_wrapping_label() {
    let doc = doc(el("form").child(
        el("label")
            .text("Email Address")
            .child(el("input").attr("type", "email")),
    ));

    let fields = scan(&doc);

    assert_eq!(labels(&fields), vec!["email address"]);
    assert_eq!(fields[0].semantic_hint, Some(SemanticType::Email));
}

#[test]
fn test_aria_label_and_labelledby() {
    let doc = doc(el("form")
        .child(el("input").attr("aria-label", "Phone Number"))
        .child(el("span").attr("id", "city-label").text("Current City"))
        .child(el("input").attr("aria-labelledby", "city-label")));

    assert_eq!(labels(&scan(&doc)), vec!["phone number", "current city"]);
}

#[test]
fn test_labelledby_text_spans_nested_elements() {
    let doc = doc(el("form")
        .child(
            el("div")
                .attr("id", "q")
                .child(el("span").text("Preferred"))
                .child(el("button").text("Help"))
                .child(el("b").child(el("i").text("Start Date"))),
        )
        .child(el("input").attr("aria-labelledby", "q")));

    assert_eq!(labels(&scan(&doc)), vec!["preferred start date"]);
}

#[test]
fn test_deeply_nested_label_text() {
    let mut text = el("span").text("Portfolio Link");
    for _ in 0..200 {
        text = el("span").child(text);
    }
    let doc = doc(el("form")
        .child(el("label").attr("for", "p").child(text))
        .child(el("input").attr("id", "p")));

    assert_eq!(labels(&scan(&doc)), vec!["portfolio link"]);
}

#[test]
fn test_placeholder_before_preceding_text() {
    let doc = doc(el("div")
        .child(el("span").text("Contact"))
        .child(el("input").attr("placeholder", "LinkedIn URL")));

    assert_eq!(labels(&scan(&doc)), vec!["linkedin url"]);
}

#[test]
fn test_preceding_text_in_group() {
    let doc = doc(el("form")
        .child(
            el("div")
                .child(el("p").text("Years of experience"))
                .child(el("div").child(el("input").attr("type", "number"))),
        )
        .child(el("div").child(el("input").attr("name", "favorite_color"))));

    let fields = scan(&doc);

    assert_eq!(fields[0].label, "years of experience");
    assert_eq!(fields[0].semantic_hint, Some(SemanticType::Number));
    // Text from the sibling group does not leak into the second field.
    assert_eq!(fields[1].label, "favorite color");
}

#[test]
fn test_preceding_text_labels_one_field() {
    let doc = doc(el("div")
        .text("Skills")
        .child(el("input").attr("id", "s1"))
        .child(el("input").attr("id", "s2")));

    assert_eq!(labels(&scan(&doc)), vec!["skills", "s 2"]);
}

#[test]
fn test_identifier_fallback() {
    let doc = doc(el("form")
        .child(el("input").attr("name", "firstName"))
        .child(el("input").attr("id", "cover_letter")));

    assert_eq!(labels(&scan(&doc)), vec!["first name", "cover letter"]);
}

#[test]
fn test_bound_label_text_not_reused() {
    let doc = doc(el("div")
        .child(el("label").attr("for", "a").text("Email"))
        .child(el("input").attr("id", "a"))
        .child(el("input").attr("name", "other")));

    assert_eq!(labels(&scan(&doc)), vec!["email", "other"]);
}

#[test]
fn test_visibility_inherited_and_disabled() {
    let doc = doc(el("form")
        .child(
            el("div")
                .attr("style", "display:none")
                .child(el("input").attr("aria-label", "Hidden Parent")),
        )
        .child(el("input").attr("aria-label", "Own Hidden").attr("hidden", ""))
        .child(el("input").attr("aria-label", "Off").attr("disabled", ""))
        .child(el("input").attr("aria-label", "Shown")));

    let fields = scan(&doc);
    let visible: Vec<bool> = fields.iter().map(|f| f.visible).collect();

    assert_eq!(visible, vec![false, false, false, true]);
    assert!(fields[2].disabled);
}

#[test]
fn test_non_fields_skipped() {
    let doc = doc(el("form")
        .child(el("input").attr("type", "hidden").attr("name", "csrf"))
        .child(el("input").attr("type", "submit").attr("value", "Send"))
        .child(el("button").text("Next"))
        .child(el("script").child(el("input").attr("name", "fake")))
        .child(el("input").attr("name", "real")));

    assert_eq!(labels(&scan(&doc)), vec!["real"]);
}

#[test]
fn test_control_kinds_and_values() {
    let doc = doc(el("form")
        .child(
            el("select")
                .attr("aria-label", "Country")
                .child(el("option").text("USA"))
                .child(el("option").attr("selected", "").text("Canada")),
        )
        .child(el("textarea").attr("aria-label", "Bio").text("hello"))
        .child(
            el("input")
                .attr("type", "checkbox")
                .attr("aria-label", "Agree")
                .attr("checked", ""),
        )
        .child(el("input").attr("type", "file").attr("aria-label", "Resume"))
        .child(el("input").attr("type", "tel").attr("aria-label", "Phone")));

    let fields = scan(&doc);
    let kinds: Vec<InputKind> = fields.iter().map(|f| f.kind).collect();

    assert_eq!(
        kinds,
        vec![
            InputKind::Select,
            InputKind::Textarea,
            InputKind::Checkbox,
            InputKind::File,
            InputKind::Text
        ]
    );
    assert_eq!(fields[0].options, vec!["USA", "Canada"]);
    assert_eq!(
        fields[0].current_value,
        CurrentValue::Selected(Some("Canada".to_string()))
    );
    assert_eq!(fields[1].current_value, CurrentValue::Text("hello".to_string()));
    assert_eq!(fields[2].current_value, CurrentValue::Checked(true));
    assert_eq!(fields[4].semantic_hint, Some(SemanticType::Phone));
}

#[test]
fn test_select_options_not_used_as_label() {
    let doc = doc(el("div")
        .child(
            el("select")
                .attr("name", "state")
                .child(el("option").text("Alaska")),
        )
        .child(el("input").attr("name", "zip")));

    assert_eq!(labels(&scan(&doc)), vec!["state", "zip"]);
}

#[test]
fn test_frames_scanned_in_place() {
    let doc = doc(el("div")
        .child(el("input").attr("aria-label", "Before"))
        .child(el("iframe").frame(
            el("html").child(
                el("body")
                    .child(el("label").attr("for", "x").text("Inside"))
                    .child(el("input").attr("id", "x")),
            ),
            true,
        ))
        .child(el("iframe").frame(
            el("html").child(el("input").attr("aria-label", "Foreign")),
            false,
        ))
        .child(el("input").attr("aria-label", "After")));

    let fields = scan(&doc);

    assert_eq!(labels(&fields), vec!["before", "inside", "after"]);
    let orders: Vec<usize> = fields.iter().map(|f| f.order).collect();
    assert_eq!(orders, vec![0, 1, 2]);
}

#[test]
fn test_frame_label_ids_scoped() {
    // The outer label targets id "x"; the framed input with the same id
    // must not pick it up.
    let doc = doc(el("div")
        .child(el("label").attr("for", "x").text("Outer"))
        .child(el("input").attr("id", "x"))
        .child(el("iframe").frame(
            el("body").child(el("input").attr("id", "x").attr("placeholder", "Inner")),
            true,
        )));

    assert_eq!(labels(&scan(&doc)), vec!["outer", "inner"]);
}

#[test]
fn test_scan_is_idempotent() {
    let doc = doc(el("form")
        .child(el("label").attr("for", "e").text("Email"))
        .child(el("input").attr("id", "e"))
        .child(el("textarea").attr("name", "coverLetter")));

    let first = scan(&doc);
    let second = scan(&doc);

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        assert!(a.same_shape(b));
    }
}
