//! Upload session state
//!
//! The session owns the ordered selection and the URLs of the files already
//! stored. `uploaded_urls[i]` always belongs to `selected[i]`, so the resume
//! point of a failed batch is simply `uploaded_urls.len()`.

use std::fmt;

use athenaeum_core::models::PendingFile;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Validating,
    Uploading,
    Creating,
    Failed,
}

impl Phase {
    /// A submit is running and owns the session.
    pub fn is_busy(self) -> bool {
        matches!(self, Phase::Validating | Phase::Uploading | Phase::Creating)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Validating => write!(f, "validating"),
            Phase::Uploading => write!(f, "uploading"),
            Phase::Creating => write!(f, "creating"),
            Phase::Failed => write!(f, "failed"),
        }
    }
}

/// Point-in-time progress published to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub session_id: Uuid,
    pub phase: Phase,
    pub current_file_index: usize,
    pub total_files: usize,
    pub current_file_name: Option<String>,
    pub percentage: u8,
    pub uploaded_count: usize,
}

/// One row of the selection as shown to the user, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayEntry {
    pub display_index: usize,
    /// Position in selection order, which is also the upload order.
    pub upload_index: usize,
    pub file_id: Uuid,
    pub name: String,
    pub size: u64,
    pub uploaded: bool,
}

#[derive(Debug, Clone)]
pub struct UploadSession {
    pub(crate) id: Uuid,
    pub(crate) selected: Vec<PendingFile>,
    pub(crate) uploaded_urls: Vec<String>,
    pub(crate) phase: Phase,
    pub(crate) current_file_index: usize,
    pub(crate) current_file_name: Option<String>,
    pub(crate) percentage: u8,
    pub(crate) total_files: usize,
    pub(crate) epoch: u64,
}

impl Default for UploadSession {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            selected: Vec::new(),
            uploaded_urls: Vec::new(),
            phase: Phase::Idle,
            current_file_index: 0,
            current_file_name: None,
            percentage: 0,
            total_files: 0,
            epoch: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn selected(&self) -> &[PendingFile] {
        &self.selected
    }

    pub fn uploaded_urls(&self) -> &[String] {
        &self.uploaded_urls
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            session_id: self.id,
            phase: self.phase,
            current_file_index: self.current_file_index,
            total_files: self.total_files,
            current_file_name: self.current_file_name.clone(),
            percentage: self.percentage,
            uploaded_count: self.uploaded_urls.len(),
        }
    }

    pub fn display_files(&self) -> Vec<DisplayEntry> {
        self.selected
            .iter()
            .enumerate()
            .rev()
            .enumerate()
            .map(|(display_index, (upload_index, file))| DisplayEntry {
                display_index,
                upload_index,
                file_id: file.id,
                name: file.name.clone(),
                size: file.size,
                uploaded: upload_index < self.uploaded_urls.len(),
            })
            .collect()
    }

    /// Selection index for a display row.
    pub fn upload_index_for_display(&self, display_index: usize) -> Option<usize> {
        let len = self.selected.len();
        (display_index < len).then(|| len - 1 - display_index)
    }

    /// Next file to upload and its index, or `None` when every file is stored.
    pub(crate) fn next_pending(&self) -> Option<(usize, PendingFile)> {
        let index = self.uploaded_urls.len();
        self.selected.get(index).map(|file| (index, file.clone()))
    }

    pub(crate) fn begin_uploading(&mut self) {
        self.phase = Phase::Uploading;
        self.total_files = self.selected.len();
        self.current_file_index = self.uploaded_urls.len();
        self.percentage = percentage(self.current_file_index, self.total_files);
    }

    pub(crate) fn record_upload(&mut self, file_url: String) {
        self.uploaded_urls.push(file_url);
        self.current_file_index = self.uploaded_urls.len();
        self.percentage = percentage(self.current_file_index, self.total_files);
    }

    pub(crate) fn begin_creating(&mut self) {
        self.phase = Phase::Creating;
        self.percentage = 100;
        self.current_file_name = None;
    }

    /// Drop stored URLs and progress; the selection is kept.
    pub(crate) fn invalidate(&mut self) {
        self.uploaded_urls.clear();
        self.phase = Phase::Idle;
        self.current_file_index = 0;
        self.current_file_name = None;
        self.percentage = 0;
        self.total_files = 0;
        self.epoch += 1;
    }

    /// Start over with an empty selection under a new session id.
    pub(crate) fn clear(&mut self) {
        self.invalidate();
        self.selected.clear();
        self.id = Uuid::new_v4();
    }
}

/// Whole-number percentage of `done` out of `total`.
pub fn percentage(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let ratio = done.min(total) as f64 / total as f64;
    (ratio * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn session_with(names: &[&str]) -> UploadSession {
        let mut session = UploadSession::new();
        session.selected = names
            .iter()
            .map(|n| PendingFile::from_bytes(*n, "text/plain", Bytes::from("x")))
            .collect();
        session
    }

    #[test]
    fn percentage_rounds_to_nearest() {
        assert_eq!(percentage(0, 3), 0);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(3, 3), 100);
        assert_eq!(percentage(1, 0), 0);
    }

    #[test]
    fn display_is_newest_first_with_explicit_upload_index() {
        let mut session = session_with(&["a", "b", "c"]);
        session.uploaded_urls.push("url-a".to_string());

        let rows = session.display_files();
        let pairs: Vec<_> = rows
            .iter()
            .map(|r| (r.display_index, r.upload_index, r.name.as_str(), r.uploaded))
            .collect();
        assert_eq!(
            pairs,
            vec![(0, 2, "c", false), (1, 1, "b", false), (2, 0, "a", true)]
        );
        assert_eq!(session.upload_index_for_display(0), Some(2));
        assert_eq!(session.upload_index_for_display(3), None);
    }

    #[test]
    fn next_pending_follows_the_uploaded_prefix() {
        let mut session = session_with(&["a", "b"]);
        session.begin_uploading();
        assert_eq!(session.next_pending().map(|(i, f)| (i, f.name)), Some((0, "a".into())));

        session.record_upload("url-a".to_string());
        assert_eq!(session.percentage, 50);
        assert_eq!(session.next_pending().map(|(i, f)| (i, f.name)), Some((1, "b".into())));

        session.record_upload("url-b".to_string());
        assert!(session.next_pending().is_none());
    }

    #[test]
    fn invalidate_keeps_selection_and_bumps_epoch() {
        let mut session = session_with(&["a", "b"]);
        session.begin_uploading();
        session.record_upload("url-a".to_string());

        session.invalidate();

        assert_eq!(session.selected.len(), 2);
        assert!(session.uploaded_urls.is_empty());
        assert_eq!(session.phase, Phase::Idle);
        assert_eq!(session.epoch, 1);

        let id = session.id;
        session.clear();
        assert!(session.selected.is_empty());
        assert_eq!(session.epoch, 2);
        assert_ne!(session.id, id);
    }
}
