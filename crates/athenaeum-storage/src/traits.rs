//! Storage abstraction trait
//!
//! This module defines the `StorageUploader` trait that every storage backend
//! implements, and the error raised when a single file fails to reach storage.

use async_trait::async_trait;
use athenaeum_core::models::{PendingFile, StoredFile};
use athenaeum_core::{ErrorMetadata, LogLevel};
use thiserror::Error;

/// A single file failed to reach storage.
#[derive(Debug, Error)]
#[error("Upload of {file_name} failed: {source}")]
pub struct UploadError {
    pub file_name: String,
    #[source]
    pub source: anyhow::Error,
}

impl UploadError {
    pub fn new(file_name: impl Into<String>, source: anyhow::Error) -> Self {
        Self {
            file_name: file_name.into(),
            source,
        }
    }
}

impl ErrorMetadata for UploadError {
    fn error_code(&self) -> &'static str {
        "UPLOAD_FAILED"
    }

    fn is_recoverable(&self) -> bool {
        true
    }

    fn suggested_action(&self) -> Option<&'static str> {
        Some("Resubmit to resume from this file, or reset to start over")
    }

    fn client_message(&self) -> String {
        format!("Failed to upload {}", self.file_name)
    }

    fn log_level(&self) -> LogLevel {
        LogLevel::Warn
    }
}

/// Result type for storage operations
pub type UploadResult<T> = Result<T, UploadError>;

/// Storage abstraction trait
///
/// Uploads one pending file into the given folder (namespace) and returns the
/// URL the storage service assigned to it.
#[async_trait]
pub trait StorageUploader: Send + Sync {
    async fn upload(&self, file: &PendingFile, folder: &str) -> UploadResult<StoredFile>;
}
