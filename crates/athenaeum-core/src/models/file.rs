use std::path::{Path, PathBuf};

use anyhow::Context;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where the bytes of a pending file come from.
#[derive(Debug, Clone)]
pub enum FileSource {
    Memory(Bytes),
    Path(PathBuf),
}

/// A local file selected for upload but not yet stored.
#[derive(Debug, Clone)]
pub struct PendingFile {
    /// Identity of this selection; two selections of the same file differ.
    pub id: Uuid,
    pub name: String,
    pub size: u64,
    pub content_type: String,
    pub source: FileSource,
}

impl PendingFile {
    /// Build a pending file from bytes already in memory.
    pub fn from_bytes(name: impl Into<String>, content_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            size: data.len() as u64,
            content_type: content_type.into(),
            source: FileSource::Memory(data),
        }
    }

    /// Build a pending file from a path on disk. Only metadata is read here;
    /// the content is read when the file is uploaded.
    pub async fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path)
            .await
            .with_context(|| format!("Failed to stat file: {}", path.display()))?;
        if !metadata.is_file() {
            return Err(anyhow::anyhow!("Not a regular file: {}", path.display()));
        }

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("file")
            .to_string();

        Ok(Self {
            id: Uuid::new_v4(),
            content_type: content_type_for(&name).to_string(),
            name,
            size: metadata.len(),
            source: FileSource::Path(path.to_path_buf()),
        })
    }

    /// Load the full content of the file.
    pub async fn read(&self) -> anyhow::Result<Bytes> {
        match &self.source {
            FileSource::Memory(data) => Ok(data.clone()),
            FileSource::Path(path) => {
                let data = tokio::fs::read(path)
                    .await
                    .with_context(|| format!("Failed to read file: {}", path.display()))?;
                Ok(Bytes::from(data))
            }
        }
    }
}

/// Location of a file confirmed stored by the object-storage service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub file_url: String,
    #[serde(default)]
    pub file_name: String,
}

/// Best-effort MIME type from the file extension.
pub fn content_type_for(filename: &str) -> &'static str {
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "zip" => "application/zip",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "mp4" => "video/mp4",
        "mp3" => "audio/mpeg",
        _ => "application/octet-stream",
    }
}
