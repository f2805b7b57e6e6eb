//! Error types module
//!
//! This module holds the validation half of the error taxonomy together with the
//! `ErrorMetadata` trait every Athenaeum error implements. Upload, catalog and
//! lifecycle errors live next to the components that raise them and implement
//! the same trait, so callers can present any failure uniformly.

use std::fmt;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like a failed upload
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error should be presented to the caller.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "DUPLICATE_TITLE")
    fn error_code(&self) -> &'static str;

    /// Whether resubmitting the same operation can succeed
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the user
    fn suggested_action(&self) -> Option<&'static str>;

    /// User-facing message (may differ from the internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors raised before anything is sent to storage.
///
/// None of these leave side effects behind: the upload session stays where it
/// was and can be corrected and resubmitted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid fields: {}", join_fields(.0))]
    MissingFields(Vec<FieldError>),

    #[error("At least one file must be selected")]
    NoFiles,

    #[error("File too large: {name} is {size} bytes, limit is {limit} bytes")]
    FileTooLarge { name: String, size: u64, limit: u64 },

    #[error("Too many files: {count} selected, limit is {limit}")]
    TooManyFiles { count: usize, limit: usize },

    #[error("A resource titled \"{0}\" already exists")]
    DuplicateTitle(String),

    #[error("Invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    FieldError::new(field.to_string(), message)
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        ValidationError::MissingFields(fields)
    }
}

impl ErrorMetadata for ValidationError {
    fn error_code(&self) -> &'static str {
        match self {
            ValidationError::MissingFields(_) => "INVALID_FIELDS",
            ValidationError::NoFiles => "NO_FILES",
            ValidationError::FileTooLarge { .. } => "FILE_TOO_LARGE",
            ValidationError::TooManyFiles { .. } => "TOO_MANY_FILES",
            ValidationError::DuplicateTitle(_) => "DUPLICATE_TITLE",
            ValidationError::InvalidValue { .. } => "INVALID_VALUE",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }

    fn suggested_action(&self) -> Option<&'static str> {
        match self {
            ValidationError::MissingFields(_) | ValidationError::InvalidValue { .. } => {
                Some("Correct the highlighted fields and submit again")
            }
            ValidationError::NoFiles => Some("Select at least one file"),
            ValidationError::FileTooLarge { .. } => Some("Remove or compress the oversized file"),
            ValidationError::TooManyFiles { .. } => Some("Split the files across several resources"),
            ValidationError::DuplicateTitle(_) => Some("Choose a different title"),
        }
    }

    fn client_message(&self) -> String {
        match self {
            ValidationError::DuplicateTitle(title) => {
                format!("Duplicate resource: \"{}\" already exists", title)
            }
            other => other.to_string(),
        }
    }

    fn log_level(&self) -> LogLevel {
        LogLevel::Debug
    }
}
