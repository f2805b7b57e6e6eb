//! Athenaeum Core Library
//!
//! This crate provides the domain models, error taxonomy and configuration
//! shared by every Athenaeum component: the HTTP client, the storage uploader,
//! the resource catalog and the upload pipeline.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{ErrorMetadata, FieldError, LogLevel, ValidationError};
