use athenaeum_catalog::CatalogError;
use athenaeum_core::{ErrorMetadata, LogLevel, ValidationError};
use athenaeum_storage::UploadError;
use thiserror::Error;

use crate::session::Phase;

/// Failure of a submit or selection call.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A file failed to reach storage. Files before `index` are stored.
    #[error("Upload stopped at file {index}: {source}")]
    Upload {
        index: usize,
        #[source]
        source: UploadError,
    },

    /// Every file is stored but the catalog record was not created.
    #[error("Files are stored but the resource could not be created: {0}")]
    Create(#[source] CatalogError),

    #[error("Upload session is busy ({0})")]
    Busy(Phase),

    #[error("Upload session was reset while a step was in flight")]
    SessionReset,
}

impl ErrorMetadata for PipelineError {
    fn error_code(&self) -> &'static str {
        match self {
            PipelineError::Validation(e) => e.error_code(),
            PipelineError::Upload { .. } => "UPLOAD_FAILED",
            PipelineError::Create(_) => "CREATE_FAILED",
            PipelineError::Busy(_) => "SESSION_BUSY",
            PipelineError::SessionReset => "SESSION_RESET",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            PipelineError::Validation(e) => e.is_recoverable(),
            PipelineError::Upload { .. } | PipelineError::Create(_) => true,
            PipelineError::Busy(_) => true,
            PipelineError::SessionReset => false,
        }
    }

    fn suggested_action(&self) -> Option<&'static str> {
        match self {
            PipelineError::Validation(e) => e.suggested_action(),
            PipelineError::Upload { .. } => Some("Resubmit to resume from the failed file"),
            PipelineError::Create(_) => {
                Some("Resubmit to register the resource; files will not be uploaded again")
            }
            PipelineError::Busy(_) => Some("Wait for the current upload to finish"),
            PipelineError::SessionReset => None,
        }
    }

    fn client_message(&self) -> String {
        match self {
            PipelineError::Validation(e) => e.client_message(),
            PipelineError::Upload { source, .. } => {
                format!("{} could not be uploaded", source.file_name)
            }
            PipelineError::Create(_) => {
                "Your files were uploaded but the resource could not be saved".to_string()
            }
            other => other.to_string(),
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            PipelineError::Validation(e) => e.log_level(),
            PipelineError::Upload { .. } | PipelineError::SessionReset => LogLevel::Warn,
            PipelineError::Create(_) => LogLevel::Error,
            PipelineError::Busy(_) => LogLevel::Debug,
        }
    }
}
