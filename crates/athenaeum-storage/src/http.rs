use async_trait::async_trait;
use athenaeum_api_client::ApiClient;
use athenaeum_core::models::{PendingFile, StoredFile};

use crate::traits::{StorageUploader, UploadError, UploadResult};

/// Object-storage uploader speaking the storage service's multipart API.
#[derive(Clone, Debug)]
pub struct HttpStorageUploader {
    client: ApiClient,
}

impl HttpStorageUploader {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StorageUploader for HttpStorageUploader {
    async fn upload(&self, file: &PendingFile, folder: &str) -> UploadResult<StoredFile> {
        let start = std::time::Instant::now();

        let data = file
            .read()
            .await
            .map_err(|e| UploadError::new(&file.name, e))?;

        let stored = self
            .client
            .upload_file(folder, &file.name, &file.content_type, data)
            .await
            .map_err(|e| UploadError::new(&file.name, e))?;

        tracing::info!(
            file_name = %file.name,
            folder = %folder,
            size_bytes = file.size,
            url = %stored.file_url,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Storage upload successful"
        );

        Ok(stored)
    }
}
