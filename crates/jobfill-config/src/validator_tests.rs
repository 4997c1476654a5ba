    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = Config::default();
        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.is_valid());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_validate_threshold_out_of_range() {
        let mut config = Config::default();
        config.matcher.fuzzy_threshold = 1.5;

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.path == "matcher.fuzzy_threshold"));
    }

    #[test]
    fn test_validate_zero_threshold() {
        let mut config = Config::default();
        config.matcher.fuzzy_threshold = 0.0;

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(!result.is_valid());
    }

    #[test]
    fn test_validate_low_threshold_warning() {
        let mut config = Config::default();
        config.matcher.fuzzy_threshold = 0.2;

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.is_valid());
        assert!(!result.warnings.is_empty());
    }

    #[test]
    fn test_validate_confidence_out_of_range() {
        let mut config = Config::default();
        config.matcher.inference_min_confidence = 120.0;

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result
            .errors
            .iter()
            .any(|e| e.path == "matcher.inference_min_confidence"));
    }

    #[test]
    fn test_validate_unknown_semantic_type() {
        let mut config = Config::default();
        config
            .matcher
            .semantic_types
            .insert("salary".to_string(), "money".to_string());

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(!result.is_valid());
        assert!(result.errors[0].message.contains("money"));
    }

    #[test]
    fn test_validate_empty_synonym() {
        let mut config = Config::default();
        config
            .matcher
            .synonyms
            .insert("email".to_string(), vec!["  ".to_string()]);

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(!result.is_valid());
    }

    #[test]
    fn test_validate_empty_advance_keywords() {
        let mut config = Config::default();
        config.navigator.advance_keywords.clear();

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result
            .errors
            .iter()
            .any(|e| e.path == "navigator.advance_keywords"));
    }

    #[test]
    fn test_validate_disabled_navigator_allows_no_keywords() {
        let mut config = Config::default();
        config.navigator.enabled = false;
        config.navigator.advance_keywords.clear();

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.is_valid());
    }

    #[test]
    fn test_validate_invalid_api_url() {
        let mut config = Config::default();
        config.inference.api_url = "api.openai.com".to_string();

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(!result.is_valid());
    }

    #[test]
    fn test_validate_api_url_scheme() {
        let mut config = Config::default();
        config.inference.api_url = "ftp://llm.internal/v1".to_string();

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.errors.iter().any(|e| e.message.contains("ftp")));
    }

    #[test]
    fn test_plain_http_warns_when_enabled() {
        let mut config = Config::default();
        config.inference.enabled = true;
        config.inference.api_url = "http://localhost:8000/v1/chat/completions".to_string();

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.path == "inference.api_url"));
    }

    #[test]
    fn test_into_error() {
        let mut config = Config::default();
        config.navigator.mutation_wait_ms = 0;

        let result = ConfigValidator::validate(&config).unwrap();
        let err = result.into_error().unwrap();
        assert!(err.to_string().contains("mutation_wait_ms"));
    }

    #[test]
    fn test_validation_result_default() {
        let result = ValidationResult::default();
        assert!(result.is_valid());
        assert!(result.into_error().is_none());
    }
