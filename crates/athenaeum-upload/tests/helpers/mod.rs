//! Test helpers: fake storage and fixtures for orchestrator tests.

pub mod fixtures;
pub mod storage;

use std::sync::Arc;

use athenaeum_catalog::memory::InMemoryCatalog;
use athenaeum_upload::{OrchestratorOptions, UploadOrchestrator};

use storage::FakeUploader;

pub struct Harness {
    pub orchestrator: Arc<UploadOrchestrator>,
    pub uploader: Arc<FakeUploader>,
    pub catalog: Arc<InMemoryCatalog>,
}

pub fn harness() -> Harness {
    harness_with(OrchestratorOptions::default())
}

pub fn harness_with(options: OrchestratorOptions) -> Harness {
    let uploader = Arc::new(FakeUploader::default());
    let catalog = Arc::new(InMemoryCatalog::new());
    let orchestrator = Arc::new(UploadOrchestrator::new(
        uploader.clone(),
        catalog.clone(),
        options,
    ));
    Harness {
        orchestrator,
        uploader,
        catalog,
    }
}
