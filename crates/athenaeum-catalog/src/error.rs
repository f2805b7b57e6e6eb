use athenaeum_api_client::status_of;
use athenaeum_core::models::{LifecycleState, ResourceId};
use athenaeum_core::{ErrorMetadata, LogLevel};
use thiserror::Error;

/// Catalog operation errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Resource not found: {0}")]
    NotFound(ResourceId),

    #[error("Catalog request failed: {source}")]
    Request {
        #[source]
        source: anyhow::Error,
    },
}

impl CatalogError {
    /// Classify a client error. A 404 on a by-id call becomes `NotFound`.
    pub fn from_request(id: Option<&ResourceId>, source: anyhow::Error) -> Self {
        match (id, status_of(&source)) {
            (Some(id), Some(404)) => CatalogError::NotFound(id.clone()),
            _ => CatalogError::Request { source },
        }
    }
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

impl ErrorMetadata for CatalogError {
    fn error_code(&self) -> &'static str {
        match self {
            CatalogError::InvalidInput(_) => "INVALID_INPUT",
            CatalogError::NotFound(_) => "NOT_FOUND",
            CatalogError::Request { .. } => "CATALOG_UNAVAILABLE",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, CatalogError::Request { .. })
    }

    fn suggested_action(&self) -> Option<&'static str> {
        match self {
            CatalogError::InvalidInput(_) => Some("Check request parameters and try again"),
            CatalogError::NotFound(_) => Some("Verify the resource ID exists"),
            CatalogError::Request { .. } => Some("Retry after a short delay"),
        }
    }

    fn client_message(&self) -> String {
        match self {
            CatalogError::InvalidInput(msg) => msg.clone(),
            CatalogError::NotFound(id) => format!("Resource {} not found", id),
            CatalogError::Request { .. } => "The resource catalog could not be reached".to_string(),
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            CatalogError::InvalidInput(_) | CatalogError::NotFound(_) => LogLevel::Debug,
            CatalogError::Request { .. } => LogLevel::Error,
        }
    }
}

/// Failure of a single lifecycle transition.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Resource {0} must be trashed before it can be permanently deleted")]
    NotTrashed(ResourceId),

    #[error("Resource {id} did not end up {expected}; it was toggled concurrently")]
    ConcurrentToggle {
        id: ResourceId,
        expected: LifecycleState,
    },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl ErrorMetadata for LifecycleError {
    fn error_code(&self) -> &'static str {
        match self {
            LifecycleError::NotTrashed(_) => "NOT_TRASHED",
            LifecycleError::ConcurrentToggle { .. } => "CONCURRENT_TOGGLE",
            LifecycleError::Catalog(e) => e.error_code(),
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            LifecycleError::NotTrashed(_) => false,
            LifecycleError::ConcurrentToggle { .. } => true,
            LifecycleError::Catalog(e) => e.is_recoverable(),
        }
    }

    fn suggested_action(&self) -> Option<&'static str> {
        match self {
            LifecycleError::NotTrashed(_) => Some("Move the resource to the trash first"),
            LifecycleError::ConcurrentToggle { .. } => Some("Reload the resource and try again"),
            LifecycleError::Catalog(e) => e.suggested_action(),
        }
    }

    fn client_message(&self) -> String {
        match self {
            LifecycleError::Catalog(e) => e.client_message(),
            other => other.to_string(),
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            LifecycleError::NotTrashed(_) => LogLevel::Debug,
            LifecycleError::ConcurrentToggle { .. } => LogLevel::Warn,
            LifecycleError::Catalog(e) => e.log_level(),
        }
    }
}
