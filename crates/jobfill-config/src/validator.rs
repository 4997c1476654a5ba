//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::{Config, SEMANTIC_TYPE_NAMES};

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// First error as a [`ConfigError`], if any.
    pub fn into_error(self) -> Option<ConfigError> {
        self.errors.into_iter().next().map(|e| ConfigError::InvalidValue {
            field: e.path,
            message: e.message,
        })
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_matcher(config, &mut result);
        Self::validate_navigator(config, &mut result);
        Self::validate_inference(config, &mut result);

        Ok(result)
    }

    fn validate_matcher(config: &Config, result: &mut ValidationResult) {
        let matcher = &config.matcher;

        if !(matcher.fuzzy_threshold > 0.0 && matcher.fuzzy_threshold <= 1.0) {
            result.add_error(ValidationError::new(
                "matcher.fuzzy_threshold",
                "fuzzy_threshold must be within (0, 1]",
            ));
        } else if matcher.fuzzy_threshold < 0.4 {
            result.add_warning(ValidationWarning::new(
                "matcher.fuzzy_threshold",
                "fuzzy_threshold below 0.4 will produce many spurious matches",
            ));
        }

        if !(0.0..=100.0).contains(&matcher.inference_min_confidence) {
            result.add_error(ValidationError::new(
                "matcher.inference_min_confidence",
                "inference_min_confidence must be within [0, 100]",
            ));
        }

        for (key, synonyms) in &matcher.synonyms {
            if synonyms.iter().any(|s| s.trim().is_empty()) {
                result.add_error(ValidationError::new(
                    format!("matcher.synonyms.{}", key),
                    "Synonyms cannot be empty strings",
                ));
            }
        }

        for (key, name) in &matcher.semantic_types {
            if !SEMANTIC_TYPE_NAMES.contains(&name.as_str()) {
                result.add_error(ValidationError::new(
                    format!("matcher.semantic_types.{}", key),
                    format!(
                        "Unknown semantic type '{}', valid values: {:?}",
                        name, SEMANTIC_TYPE_NAMES
                    ),
                ));
            }
        }
    }

    fn validate_navigator(config: &Config, result: &mut ValidationResult) {
        let navigator = &config.navigator;

        if navigator.enabled && navigator.advance_keywords.iter().all(|k| k.trim().is_empty()) {
            result.add_error(ValidationError::new(
                "navigator.advance_keywords",
                "At least one advance keyword is required when navigation is enabled",
            ));
        }

        if navigator.click_entry && navigator.entry_keywords.iter().all(|k| k.trim().is_empty()) {
            result.add_error(ValidationError::new(
                "navigator.entry_keywords",
                "At least one entry keyword is required when click_entry is set",
            ));
        }

        if navigator.max_rescans > 20 {
            result.add_warning(ValidationWarning::new(
                "navigator.max_rescans",
                "max_rescans is very high (>20), pages without a proceed control will linger",
            ));
        }

        if navigator.mutation_wait_ms == 0 {
            result.add_error(ValidationError::new(
                "navigator.mutation_wait_ms",
                "mutation_wait_ms must be greater than 0",
            ));
        }

        if navigator.debounce_ms > navigator.mutation_wait_ms {
            result.add_warning(ValidationWarning::new(
                "navigator.debounce_ms",
                "debounce_ms exceeds mutation_wait_ms",
            ));
        }
    }

    fn validate_inference(config: &Config, result: &mut ValidationResult) {
        let inference = &config.inference;

        match url::Url::parse(&inference.api_url) {
            Ok(url) if url.scheme() == "https" => {}
            Ok(url) if url.scheme() == "http" => {
                if inference.enabled {
                    result.add_warning(ValidationWarning::new(
                        "inference.api_url",
                        "api_url is not using TLS; the API key is sent in clear text",
                    ));
                }
            }
            Ok(url) => result.add_error(ValidationError::new(
                "inference.api_url",
                format!("Unsupported api_url scheme '{}'", url.scheme()),
            )),
            Err(e) => result.add_error(ValidationError::new(
                "inference.api_url",
                format!("Invalid api_url: {}", e),
            )),
        }

        if inference.enabled && inference.model.is_empty() {
            result.add_error(ValidationError::new(
                "inference.model",
                "model cannot be empty when inference is enabled",
            ));
        }

        if inference.max_label_chars == 0 {
            result.add_error(ValidationError::new(
                "inference.max_label_chars",
                "max_label_chars must be greater than 0",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
