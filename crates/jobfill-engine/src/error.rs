//! Engine error types.

use thiserror::Error;

/// Capability registry errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    #[error("Capability already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Capability not found: {0}")]
    NotFound(String),
}
