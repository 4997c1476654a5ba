//! File store errors.

use std::path::PathBuf;
use thiserror::Error;

use jobfill_protocols::StoreError;

/// Errors that can occur in file store operations.
#[derive(Debug, Error)]
pub enum FileStoreError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The store file is not a JSON object of strings.
    #[error("Failed to parse store file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    /// Failed to serialize the store contents.
    #[error("Failed to serialize store: {0}")]
    Serialize(String),

    /// No home directory to derive the default path from.
    #[error("Storage path not set")]
    StoragePathNotSet,

    /// Failed to create the directory holding the store file.
    #[error("Failed to create storage directory at {path}: {reason}")]
    CreateDirFailed { path: PathBuf, reason: String },
}

impl From<FileStoreError> for StoreError {
    fn from(err: FileStoreError) -> Self {
        match err {
            FileStoreError::Io(e) => StoreError::Io(e),
            FileStoreError::Parse { .. } | FileStoreError::Serialize(_) => {
                StoreError::Serialization(err.to_string())
            }
            FileStoreError::StoragePathNotSet | FileStoreError::CreateDirFailed { .. } => {
                StoreError::Unavailable(err.to_string())
            }
        }
    }
}
