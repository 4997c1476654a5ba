//! Remote inference strategy errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Inference unavailable: {0}")]
    Unavailable(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = InferenceError::Api {
            status: 401,
            message: "Invalid API key".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("401"));
        assert!(display.contains("Invalid API key"));
    }

    #[test]
    fn test_all_error_variants() {
        let errors = vec![
            InferenceError::Unavailable("no key".to_string()),
            InferenceError::Network("refused".to_string()),
            InferenceError::Api {
                status: 500,
                message: "boom".to_string(),
            },
            InferenceError::InvalidResponse("not json".to_string()),
        ];

        for err in errors {
            assert!(!err.to_string().is_empty());
        }
    }
}
