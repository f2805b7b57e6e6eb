//! Upload orchestration
//!
//! The pipeline runs as a small state machine over one `UploadSession`:
//!
//! 1. **Validating**: metadata and selection are checked, then the catalog is
//!    probed for a resource with the same title
//! 2. **Uploading**: files go to storage one at a time in selection order,
//!    starting after the already stored prefix
//! 3. **Creating**: the catalog record is created with every stored URL
//!
//! A failure in step 2 or 3 leaves the session `Failed` with its stored
//! prefix intact; the next `submit` resumes from there. Removing a file or
//! resetting bumps the session epoch, and a step that finishes under a stale
//! epoch drops its result. A submit future dropped mid-flight leaves the
//! session `Failed`, so the next `submit` resumes.
//!
//! The session lock is only held between network calls, never across them.

use std::sync::Arc;

use athenaeum_catalog::{DuplicateTitleGuard, ResourceCatalog};
use athenaeum_core::constants::{DEFAULT_STORAGE_FOLDER, DUPLICATE_CHECK_LIMIT};
use athenaeum_core::models::{PendingFile, Resource, ResourceDraft};
use athenaeum_core::{ClientConfig, ValidationError};
use athenaeum_storage::StorageUploader;
use tokio::sync::{watch, Mutex, MutexGuard};
use uuid::Uuid;

use crate::error::PipelineError;
use crate::session::{DisplayEntry, Phase, ProgressSnapshot, UploadSession};
use crate::validator::{Admission, FileQuota};

/// Orchestrator settings
#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    /// Storage folder files are uploaded into
    pub folder: String,
    pub quota: FileQuota,
    /// Search hits inspected by the duplicate-title probe
    pub duplicate_check_limit: u32,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            folder: DEFAULT_STORAGE_FOLDER.to_string(),
            quota: FileQuota::default(),
            duplicate_check_limit: DUPLICATE_CHECK_LIMIT,
        }
    }
}

impl OrchestratorOptions {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            folder: config.storage_folder.clone(),
            quota: FileQuota::from_config(config),
            duplicate_check_limit: config.duplicate_check_limit,
        }
    }
}

pub struct UploadOrchestrator {
    uploader: Arc<dyn StorageUploader>,
    catalog: Arc<dyn ResourceCatalog>,
    guard: DuplicateTitleGuard,
    options: OrchestratorOptions,
    session: Arc<Mutex<UploadSession>>,
    progress: Arc<watch::Sender<ProgressSnapshot>>,
}

/// Marks a still-busy session `Failed` when its submit future is dropped.
struct SubmitGuard {
    session: Arc<Mutex<UploadSession>>,
    progress: Arc<watch::Sender<ProgressSnapshot>>,
    epoch: u64,
}

impl SubmitGuard {
    fn abandon(
        session: &mut UploadSession,
        epoch: u64,
        progress: &watch::Sender<ProgressSnapshot>,
    ) {
        if session.epoch != epoch || !session.phase.is_busy() {
            return;
        }
        tracing::warn!(
            session_id = %session.id,
            phase = %session.phase,
            stored = session.uploaded_urls.len(),
            "Submit dropped mid-flight, session marked failed"
        );
        session.phase = Phase::Failed;
        progress.send_replace(session.snapshot());
    }
}

impl Drop for SubmitGuard {
    fn drop(&mut self) {
        if let Ok(mut session) = self.session.try_lock() {
            Self::abandon(&mut session, self.epoch, &self.progress);
            return;
        }
        // Lock held elsewhere for a moment; finish on the runtime.
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let session = self.session.clone();
        let progress = self.progress.clone();
        let epoch = self.epoch;
        handle.spawn(async move {
            let mut session = session.lock().await;
            Self::abandon(&mut session, epoch, &progress);
        });
    }
}

impl UploadOrchestrator {
    pub fn new(
        uploader: Arc<dyn StorageUploader>,
        catalog: Arc<dyn ResourceCatalog>,
        options: OrchestratorOptions,
    ) -> Self {
        let session = UploadSession::new();
        let (progress, _) = watch::channel(session.snapshot());
        let guard = DuplicateTitleGuard::new(catalog.clone(), options.duplicate_check_limit);

        Self {
            uploader,
            catalog,
            guard,
            options,
            session: Arc::new(Mutex::new(session)),
            progress: Arc::new(progress),
        }
    }

    /// Add files to the selection, subject to the size and count quota.
    pub async fn select_files(&self, files: Vec<PendingFile>) -> Result<Admission, PipelineError> {
        let mut session = self.session.lock().await;
        if session.phase.is_busy() {
            return Err(PipelineError::Busy(session.phase));
        }

        let admission = self.options.quota.admit(session.selected.len(), files);
        session.selected.extend(admission.accepted.iter().cloned());

        if !admission.is_clean() {
            tracing::warn!(
                session_id = %session.id,
                accepted = admission.accepted.len(),
                rejected = admission.rejected.len(),
                dropped = admission.dropped,
                "Some files were not added to the selection"
            );
        }
        self.publish(&session);
        Ok(admission)
    }

    /// Run the pipeline, or resume it after a failure.
    pub async fn submit(&self, draft: &ResourceDraft) -> Result<Resource, PipelineError> {
        let start = std::time::Instant::now();

        let (epoch, session_id, metadata) = {
            let mut session = self.session.lock().await;
            if session.phase.is_busy() {
                return Err(PipelineError::Busy(session.phase));
            }

            let metadata = draft.validate_into_metadata()?;
            if session.selected.is_empty() {
                return Err(ValidationError::NoFiles.into());
            }
            self.options.quota.check_batch(&session.selected)?;

            session.phase = Phase::Validating;
            self.publish(&session);
            (session.epoch, session.id, metadata)
        };
        let _abandon = SubmitGuard {
            session: self.session.clone(),
            progress: self.progress.clone(),
            epoch,
        };

        tracing::info!(
            session_id = %session_id,
            title = %metadata.title,
            "Submitting resource"
        );

        if self.guard.check_duplicate(&metadata.title).await {
            let mut session = self.current(epoch).await?;
            session.phase = Phase::Idle;
            self.publish(&session);
            tracing::info!(session_id = %session_id, title = %metadata.title, "Duplicate title rejected");
            return Err(ValidationError::DuplicateTitle(metadata.title).into());
        }

        {
            let mut session = self.current(epoch).await?;
            session.begin_uploading();
            if session.current_file_index > 0 {
                tracing::info!(
                    session_id = %session_id,
                    resume_from = session.current_file_index,
                    total_files = session.total_files,
                    "Resuming upload"
                );
            }
            self.publish(&session);
        }

        self.upload_remaining(epoch, session_id).await?;

        let file_urls = {
            let mut session = self.current(epoch).await?;
            session.begin_creating();
            self.publish(&session);
            session.uploaded_urls.clone()
        };

        let created = self.catalog.create(&metadata, &file_urls).await;

        let mut session = self.session.lock().await;
        if session.epoch != epoch {
            if let Ok(resource) = &created {
                tracing::warn!(
                    session_id = %session_id,
                    resource_id = %resource.resource_id,
                    "Session reset while creating; resource was created anyway"
                );
            }
            return Err(PipelineError::SessionReset);
        }

        match created {
            Ok(resource) => {
                session.clear();
                self.publish(&session);
                tracing::info!(
                    session_id = %session_id,
                    resource_id = %resource.resource_id,
                    file_count = file_urls.len(),
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Resource upload complete"
                );
                Ok(resource)
            }
            Err(e) => {
                session.phase = Phase::Failed;
                self.publish(&session);
                tracing::error!(
                    session_id = %session_id,
                    error = %e,
                    file_count = file_urls.len(),
                    "Resource creation failed after files were stored"
                );
                Err(PipelineError::Create(e))
            }
        }
    }

    async fn upload_remaining(&self, epoch: u64, session_id: Uuid) -> Result<(), PipelineError> {
        loop {
            let (index, file) = {
                let mut session = self.current(epoch).await?;
                let Some((index, file)) = session.next_pending() else {
                    return Ok(());
                };
                session.current_file_index = index;
                session.current_file_name = Some(file.name.clone());
                self.publish(&session);
                (index, file)
            };

            let result = self.uploader.upload(&file, &self.options.folder).await;

            let mut session = self.session.lock().await;
            if session.epoch != epoch {
                tracing::warn!(
                    session_id = %session_id,
                    file_index = index,
                    file_name = %file.name,
                    "Session reset during upload, discarding result"
                );
                return Err(PipelineError::SessionReset);
            }

            match result {
                Ok(stored) => {
                    session.record_upload(stored.file_url);
                    self.publish(&session);
                    tracing::debug!(
                        session_id = %session_id,
                        file_index = index,
                        percentage = session.percentage,
                        "File stored"
                    );
                }
                Err(source) => {
                    session.phase = Phase::Failed;
                    self.publish(&session);
                    tracing::warn!(
                        session_id = %session_id,
                        file_index = index,
                        error = %source,
                        stored = session.uploaded_urls.len(),
                        "Upload halted"
                    );
                    return Err(PipelineError::Upload { index, source });
                }
            }
        }
    }

    /// Remove a file from the selection by id. Returns the removed file, or
    /// `None` when no such file is selected.
    ///
    /// Outside `idle`, or once any file is stored, the stored prefix no longer
    /// lines up with the selection: the session drops its URLs, returns to
    /// `idle` and invalidates any step still in flight.
    pub async fn remove_file(&self, file_id: Uuid) -> Option<PendingFile> {
        let mut session = self.session.lock().await;
        let position = session.selected.iter().position(|f| f.id == file_id)?;
        Some(self.remove_at(&mut session, position))
    }

    /// Remove the file shown at `display_index` of `display_files()`.
    pub async fn remove_file_at_display(&self, display_index: usize) -> Option<PendingFile> {
        let mut session = self.session.lock().await;
        let position = session.upload_index_for_display(display_index)?;
        Some(self.remove_at(&mut session, position))
    }

    fn remove_at(&self, session: &mut UploadSession, position: usize) -> PendingFile {
        let removed = session.selected.remove(position);
        if session.phase != Phase::Idle || !session.uploaded_urls.is_empty() {
            tracing::info!(
                session_id = %session.id,
                phase = %session.phase,
                discarded_urls = session.uploaded_urls.len(),
                "File removed from active session, resetting progress"
            );
            session.invalidate();
        }
        self.publish(session);
        removed
    }

    /// Cancel: empty the selection and start a fresh session.
    pub async fn reset(&self) {
        let mut session = self.session.lock().await;
        tracing::info!(
            session_id = %session.id,
            phase = %session.phase,
            "Upload session reset"
        );
        session.clear();
        self.publish(&session);
    }

    pub async fn snapshot(&self) -> ProgressSnapshot {
        self.session.lock().await.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.progress.subscribe()
    }

    pub async fn display_files(&self) -> Vec<DisplayEntry> {
        self.session.lock().await.display_files()
    }

    /// Copy of the current session state.
    pub async fn session(&self) -> UploadSession {
        self.session.lock().await.clone()
    }

    /// Lock the session if it is still the generation this submit started in.
    async fn current(&self, epoch: u64) -> Result<MutexGuard<'_, UploadSession>, PipelineError> {
        let session = self.session.lock().await;
        if session.epoch != epoch {
            tracing::warn!(session_id = %session.id, "Session reset, abandoning submit");
            return Err(PipelineError::SessionReset);
        }
        Ok(session)
    }

    fn publish(&self, session: &UploadSession) {
        self.progress.send_replace(session.snapshot());
    }
}
