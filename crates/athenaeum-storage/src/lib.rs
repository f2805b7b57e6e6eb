//! Athenaeum Storage Library
//!
//! This crate provides the storage abstraction used by the upload pipeline:
//! the `StorageUploader` trait and its HTTP implementation against the
//! external object-storage service.
//!
//! # Contract
//!
//! One call uploads one file and returns its stable URL. Implementations never
//! retry; retrying is decided at the batch level by the orchestrator, which
//! knows which files are already stored.

pub mod http;
pub mod traits;

// Re-export commonly used types
pub use http::HttpStorageUploader;
pub use traits::{StorageUploader, UploadError, UploadResult};
