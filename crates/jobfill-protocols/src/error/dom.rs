//! Host document errors.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomError {
    /// The element is no longer part of the live document, or belongs to a
    /// page instance that has since been replaced.
    #[error("Element is detached from the document")]
    Detached,

    #[error("Node is not an element")]
    NotAnElement,

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Option index {index} out of range ({len} options)")]
    OptionOutOfRange { index: usize, len: usize },
}
