use super::*;

#[test]
fn test_classifier_id() {
    assert_eq!(OpenAiClassifier::new().id(), "openai");
}

#[test]
fn test_from_config() {
    let config = InferenceConfig {
        api_url: "https://llm.internal/v1/chat/completions".to_string(),
        model: "gpt-4o-mini".to_string(),
        max_label_chars: 10,
        ..InferenceConfig::default()
    };
    let classifier = OpenAiClassifier::from_config(&config);
    assert_eq!(classifier.api_url, "https://llm.internal/v1/chat/completions");
    assert_eq!(classifier.model, "gpt-4o-mini");
    assert_eq!(classifier.max_label_chars, 10);
}

#[test]
fn test_build_request() {
    let classifier = OpenAiClassifier::new();
    let request = classifier.build_request("Are you authorized to work in the US?");

    assert_eq!(request.model, "gpt-3.5-turbo");
    assert_eq!(request.max_tokens, 50);
    assert_eq!(request.temperature, 0.0);
    assert_eq!(request.messages.len(), 2);
    assert_eq!(request.messages[0].role, "system");
    assert!(request.messages[1].content.contains("cover_letter"));
}

#[test]
fn test_label_truncated() {
    let classifier = OpenAiClassifier::new();
    let long = "x".repeat(80);
    let request = classifier.build_request(&long);

    let prompt = &request.messages[1].content;
    assert!(prompt.contains(&format!("\"{}\"", "x".repeat(50))));
    assert!(!prompt.contains(&"x".repeat(51)));
}

#[test]
fn test_parse_plain_json() {
    let c = parse_classification(r#"{"type": "email", "confidence": 97}"#).unwrap();
    assert_eq!(c.category, "email");
    assert_eq!(c.confidence, 97.0);
}

#[test]
fn test_parse_fenced_json() {
    let c = parse_classification("```json\n{\"type\": \"Phone\", \"confidence\": 88}\n```").unwrap();
    assert_eq!(c.category, "phone");
}

#[test]
fn test_parse_unknown_category_is_other() {
    let c = parse_classification(r#"{"type": "salary", "confidence": 150}"#).unwrap();
    assert_eq!(c.category, "other");
    assert_eq!(c.confidence, 100.0);
}

#[test]
fn test_parse_rejects_prose() {
    let err = parse_classification("It looks like an email field.").unwrap_err();
    assert!(matches!(err, InferenceError::InvalidResponse(_)));
}

// Wiremock-based tests for actual HTTP calls
mod http_tests {
    use super::*;
    use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

    fn completion(content: &str) -> String {
        serde_json::json!({
            "id": "chatcmpl-1",
            "model": "gpt-3.5-turbo",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_classify_success() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .and(matchers::path("/"))
            .and(matchers::header("Authorization", "Bearer sk-test"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(completion(r#"{"type":"cover_letter","confidence":91}"#)),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let classifier = OpenAiClassifier::with_url(mock_server.uri());
        let result = classifier.classify("Why do you want to join?", "sk-test").await;

        let classification = result.unwrap();
        assert_eq!(classification.category, "cover_letter");
        assert_eq!(classification.confidence, 91.0);
    }

    #[tokio::test]
    async fn test_classify_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .and(matchers::path("/"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_string(r#"{"error": {"message": "Invalid API key"}}"#),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let classifier = OpenAiClassifier::with_url(mock_server.uri());
        let result = classifier.classify("Email", "bad-key").await;

        match result {
            Err(InferenceError::Api { status, message }) => {
                assert_eq!(status, 401);
                assert!(message.contains("Invalid API key"));
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_classify_garbage_completion() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(completion("no idea")))
            .mount(&mock_server)
            .await;

        let classifier = OpenAiClassifier::with_url(mock_server.uri());
        let result = classifier.classify("Email", "sk-test").await;

        assert!(matches!(result, Err(InferenceError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_classify_without_key_skips_request() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let classifier = OpenAiClassifier::with_url(mock_server.uri());
        let result = classifier.classify("Email", "  ").await;

        assert!(matches!(result, Err(InferenceError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_classify_unreachable() {
        let classifier = OpenAiClassifier::with_url("http://127.0.0.1:9/".to_string());
        let result = classifier.classify("Email", "sk-test").await;

        assert!(matches!(result, Err(InferenceError::Network(_))));
    }
}
