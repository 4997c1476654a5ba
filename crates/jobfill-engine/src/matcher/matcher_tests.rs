use super::*;
use async_trait::async_trait;
use jobfill_protocols::{CurrentValue, ElementRef, InferenceError, PageId};
use std::collections::BTreeMap;
use std::sync::Mutex;

fn field(order: usize, label: &str) -> FieldDescriptor {
    FieldDescriptor {
        element: ElementRef::new(PageId(1), order),
        order,
        label: label.to_string(),
        kind: InputKind::Text,
        current_value: CurrentValue::Empty,
        required: false,
        visible: true,
        disabled: false,
        semantic_hint: None,
        name: None,
        html_id: None,
        options: Vec::new(),
    }
}

fn keys(results: &[MatchResult]) -> Vec<Option<&str>> {
    results.iter().map(|r| r.profile_key.as_deref()).collect()
}

#[test]
fn test_exact_synonym_match() {
    let profile = Profile::new().with("email", "ada@example.com");
    let results = FieldMatcher::default().match_fields(&[field(0, "email address")], &profile);

    assert_eq!(results[0].profile_key.as_deref(), Some("email"));
    assert_eq!(results[0].confidence, Confidence::Exact);
    assert_eq!(results[0].value, Some(Scalar::from("ada@example.com")));
}

#[test]
fn test_exact_on_key_identifier() {
    let profile = Profile::new().with("yearsExperience", 7i64);
    let results = FieldMatcher::default().match_fields(&[field(0, "years experience")], &profile);
    assert_eq!(results[0].confidence, Confidence::Exact);
    assert_eq!(results[0].value, Some(Scalar::Number(7.0)));
}

#[test]
fn test_repeatable_key_hands_out_in_order() {
    let profile = Profile::new().with("skills", ProfileValue::list(["Go", "Rust"]));
    let descriptors = [field(0, "skill 1"), field(1, "skill 2"), field(2, "skill 3")];

    let results = FieldMatcher::default().match_fields(&descriptors, &profile);

    assert_eq!(keys(&results), vec![Some("skills"), Some("skills"), None]);
    assert_eq!(results[0].value, Some(Scalar::from("Go")));
    assert_eq!(results[1].value, Some(Scalar::from("Rust")));
    assert_eq!(results[0].confidence, Confidence::Fuzzy);
}

#[test]
fn test_repeatable_order_follows_document_not_input() {
    let profile = Profile::new().with("skills", ProfileValue::list(["Go", "Rust"]));
    let descriptors = [field(1, "skill 2"), field(0, "skill 1")];

    let results = FieldMatcher::default().match_fields(&descriptors, &profile);

    assert_eq!(results[0].value, Some(Scalar::from("Rust")));
    assert_eq!(results[1].value, Some(Scalar::from("Go")));
}

#[test]
fn test_singular_key_claimed_once() {
    let profile = Profile::new().with("email", "a@b.co").with("firstName", "Ada");
    let descriptors = [field(0, "email"), field(1, "email")];

    let results = FieldMatcher::default().match_fields(&descriptors, &profile);

    assert_eq!(keys(&results), vec![Some("email"), None]);
}

#[test]
fn test_no_singular_key_shared() {
    let profile = Profile::new()
        .with("firstName", "Ada")
        .with("lastName", "Lovelace")
        .with("email", "ada@example.com")
        .with("phone", "555");
    let labels = [
        "first name",
        "given name",
        "last name",
        "surname",
        "email",
        "e mail",
        "mobile phone",
        "phone",
        "name",
        "full name",
    ];
    let descriptors: Vec<FieldDescriptor> = labels
        .iter()
        .enumerate()
        .map(|(i, l)| field(i, l))
        .collect();

    let results = FieldMatcher::default().match_fields(&descriptors, &profile);

    let mut seen = HashSet::new();
    for key in results.iter().filter_map(|r| r.profile_key.as_deref()) {
        assert!(seen.insert(key), "{} matched twice", key);
    }
    assert!(results.iter().all(|r| r.is_matched() == r.value.is_some()));
}

#[test]
fn test_fuzzy_containment() {
    let profile = Profile::new().with("phone", "555-0100");
    let results = FieldMatcher::default().match_fields(&[field(0, "mobile phone")], &profile);
    assert_eq!(results[0].profile_key.as_deref(), Some("phone"));
    assert_eq!(results[0].confidence, Confidence::Fuzzy);
}

#[test]
fn test_fuzzy_typo() {
    let profile = Profile::new().with("firstName", "Ada");
    let results = FieldMatcher::default().match_fields(&[field(0, "frist name")], &profile);
    assert_eq!(results[0].profile_key.as_deref(), Some("firstName"));
}

#[test]
fn test_generic_word_does_not_match() {
    let profile = Profile::new().with("firstName", "Ada").with("lastName", "L");
    let results = FieldMatcher::default().match_fields(&[field(0, "company name")], &profile);
    assert_eq!(results[0].confidence, Confidence::Unmatched);
    assert!(results[0].profile_key.is_none());
}

#[test]
fn test_derived_full_name() {
    let profile = Profile::new().with("firstName", "Ada").with("lastName", "Lovelace");
    let results = FieldMatcher::default().match_fields(&[field(0, "full name")], &profile);
    assert_eq!(results[0].profile_key.as_deref(), Some("fullName"));
    assert_eq!(results[0].value, Some(Scalar::from("Ada Lovelace")));
}

#[test]
fn test_fuzzy_tie_prefers_declaration_order() {
    let mut synonyms = BTreeMap::new();
    synonyms.insert("homeCity".to_string(), vec!["city".to_string()]);
    synonyms.insert("workCity".to_string(), vec!["city".to_string()]);
    let config = MatcherConfig {
        use_default_synonyms: false,
        synonyms,
        ..MatcherConfig::default()
    };
    let profile = Profile::new().with("workCity", "Berlin").with("homeCity", "Paris");

    let results = FieldMatcher::new(&config)
        .match_fields(&[field(0, "current city"), field(1, "current city")], &profile);

    assert_eq!(keys(&results), vec![Some("workCity"), Some("homeCity")]);
}

#[test]
fn test_threshold_from_config() {
    let config = MatcherConfig {
        fuzzy_threshold: 0.95,
        ..MatcherConfig::default()
    };
    let profile = Profile::new().with("phone", "555");
    let results = FieldMatcher::new(&config).match_fields(&[field(0, "mobile phone")], &profile);
    assert!(!results[0].is_matched());
}

#[test]
fn test_inferred_by_semantic_type() {
    let profile = Profile::new()
        .with("firstName", "Ada")
        .with("workEmail", "ada@example.com");
    let mut descriptor = field(0, "reach me at");
    descriptor.semantic_hint = Some(SemanticType::Email);

    let results = FieldMatcher::default().match_fields(&[descriptor], &profile);

    assert_eq!(results[0].profile_key.as_deref(), Some("workEmail"));
    assert_eq!(results[0].confidence, Confidence::Inferred);
}

#[test]
fn test_inferred_needs_unique_key() {
    let profile = Profile::new()
        .with("workEmail", "ada@work.com")
        .with("homeEmail", "ada@home.com");
    let mut descriptor = field(0, "reach me at");
    descriptor.semantic_hint = Some(SemanticType::Email);

    let results = FieldMatcher::default().match_fields(&[descriptor], &profile);

    assert!(!results[0].is_matched());
}

#[test]
fn test_inferred_document_for_file_input() {
    let profile = Profile::new()
        .with("resume", "https://files.example.com/cv.pdf")
        .with("email", "a@b.co");
    let mut descriptor = field(0, "attach");
    descriptor.kind = InputKind::File;

    let results = FieldMatcher::default().match_fields(&[descriptor], &profile);

    assert_eq!(results[0].profile_key.as_deref(), Some("resume"));
}

#[test]
fn test_hidden_duplicate_does_not_steal_key() {
    let profile = Profile::new().with("email", "a@b.co");
    let mut hidden = field(0, "email");
    hidden.visible = false;
    let shown = field(1, "email");

    let results = FieldMatcher::default().match_fields(&[hidden, shown], &profile);

    assert_eq!(keys(&results), vec![None, Some("email")]);
}

#[test]
fn test_plan_sorted_and_filtered() {
    let profile = Profile::new()
        .with("email", "a@b.co")
        .with("firstName", "Ada");
    let descriptors = [field(2, "email"), field(0, "first name"), field(1, "favorite color")];

    let plan = FieldMatcher::plan(FieldMatcher::default().match_fields(&descriptors, &profile));

    let orders: Vec<usize> = plan.iter().map(|r| r.descriptor.order).collect();
    assert_eq!(orders, vec![0, 2]);
}

/// Strategy answering from a fixed table; unknown labels fail.
struct TableStrategy {
    answers: Vec<(&'static str, &'static str, f64)>,
    calls: Mutex<Vec<String>>,
}

impl TableStrategy {
    fn new(answers: Vec<(&'static str, &'static str, f64)>) -> Self {
        Self {
            answers,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl InferenceStrategy for TableStrategy {
    fn id(&self) -> &str {
        "table"
    }

    async fn classify(
        &self,
        label: &str,
        _api_key: &str,
    ) -> Result<FieldClassification, InferenceError> {
        self.calls.lock().unwrap().push(label.to_string());
        self.answers
            .iter()
            .find(|(l, _, _)| *l == label)
            .map(|(_, category, confidence)| FieldClassification {
                category: category.to_string(),
                confidence: *confidence,
            })
            .ok_or_else(|| InferenceError::Network("unreachable".to_string()))
    }
}

#[tokio::test]
async fn test_assist_fills_unmatched() {
    let profile = Profile::new()
        .with("firstName", "Ada")
        .with("coverLetter", "Dear team");
    let strategy = TableStrategy::new(vec![
        ("what should we call", "first_name", 95.0),
        ("why us", "cover_letter", 85.0),
    ]);
    let descriptors = [field(0, "what should we call"), field(1, "why us")];

    let results = FieldMatcher::default()
        .match_with_assist(&descriptors, &profile, &strategy, "sk-test")
        .await;

    assert_eq!(keys(&results), vec![Some("firstName"), Some("coverLetter")]);
    assert!(results.iter().all(|r| r.confidence == Confidence::Inferred));
    assert!((results[0].score - 0.95).abs() < 1e-9);
}

#[tokio::test]
async fn test_assist_degrades_to_unmatched() {
    let profile = Profile::new()
        .with("email", "a@b.co")
        .with("phone", "555");
    let strategy = TableStrategy::new(vec![
        ("low", "phone", 40.0),
        ("taken", "email", 99.0),
        ("diversity", "dei", 99.0),
    ]);
    let descriptors = [
        field(0, "email"),
        field(1, "low"),
        field(2, "taken"),
        field(3, "diversity"),
        field(4, "broken"),
    ];

    let results = FieldMatcher::default()
        .match_with_assist(&descriptors, &profile, &strategy, "sk-test")
        .await;

    assert_eq!(keys(&results), vec![Some("email"), None, None, None, None]);
    // Locally matched fields are never sent out.
    let calls = strategy.calls.lock().unwrap().clone();
    assert_eq!(calls, vec!["low", "taken", "diversity", "broken"]);
}

#[tokio::test]
async fn test_assist_skips_invisible() {
    let profile = Profile::new().with("firstName", "Ada");
    let strategy = TableStrategy::new(vec![("nickname", "first_name", 99.0)]);
    let mut hidden = field(0, "nickname");
    hidden.visible = false;

    let results = FieldMatcher::default()
        .match_with_assist(&[hidden], &profile, &strategy, "sk-test")
        .await;

    assert!(!results[0].is_matched());
    assert!(strategy.calls.lock().unwrap().is_empty());
}
