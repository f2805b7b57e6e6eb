//! Athenaeum Upload Library
//!
//! Turns a selection of local files plus resource metadata into one catalog
//! resource. Files are uploaded to object storage one at a time in selection
//! order; a failed batch keeps its uploaded prefix so a resubmit resumes where
//! it stopped instead of storing files twice.

pub mod error;
pub mod orchestrator;
pub mod session;
pub mod validator;

// Re-export commonly used types
pub use error::PipelineError;
pub use orchestrator::{OrchestratorOptions, UploadOrchestrator};
pub use session::{DisplayEntry, Phase, ProgressSnapshot, UploadSession};
pub use validator::{Admission, FileQuota};
