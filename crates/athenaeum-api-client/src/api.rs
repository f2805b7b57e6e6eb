//! Domain methods for the Athenaeum API client.
//!
//! Payload types come from `athenaeum_core::models`; the wrappers defined here
//! only describe the `data` shapes of individual endpoints.

use anyhow::{Context, Result};
use athenaeum_core::models::{
    CreateResourceRequest, ListQuery, Resource, ResourceId, ResourcePage, ResourcePatch,
    StoredFile,
};
use bytes::Bytes;
use serde::Deserialize;

use crate::ApiClient;

/// `data` of single-resource endpoints: either `{resource: {...}}` or the
/// resource itself.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ResourceData {
    Wrapped { resource: Resource },
    Bare(Resource),
}

impl ResourceData {
    pub fn into_resource(self) -> Resource {
        match self {
            ResourceData::Wrapped { resource } => resource,
            ResourceData::Bare(resource) => resource,
        }
    }
}

/// `data` of the search endpoint.
#[derive(Debug, Deserialize)]
struct ResourceListData {
    #[serde(default)]
    resources: Vec<Resource>,
}

/// Which analytics counter to bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    View,
    Download,
}

impl TrackKind {
    fn path_segment(self) -> &'static str {
        match self {
            TrackKind::View => "view",
            TrackKind::Download => "download",
        }
    }
}

fn resource_path(id: &ResourceId) -> String {
    format!("/resources/{}", urlencoding::encode(id.as_str()))
}

impl ApiClient {
    /// Upload one file to the object-storage service under `folder`.
    pub async fn upload_file(
        &self,
        folder: &str,
        file_name: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<StoredFile> {
        let length = data.len() as u64;
        let part = reqwest::multipart::Part::stream_with_length(data, length)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .with_context(|| format!("Invalid content type: {}", content_type))?;

        let form = reqwest::multipart::Form::new()
            .text("folder", folder.to_string())
            .part("file", part);

        let stored: StoredFile = self.post_multipart("/upload", form).await?;
        if stored.file_url.trim().is_empty() {
            return Err(anyhow::anyhow!(
                "Storage accepted {} but returned no file URL",
                file_name
            ));
        }
        Ok(stored)
    }

    /// Search the catalog with filters and pagination.
    pub async fn search_resources(&self, query: &ListQuery) -> Result<ResourcePage> {
        let (data, pagination): (ResourceListData, _) = self
            .get("/resources", &query.to_query_pairs())
            .await
            .context("Failed to search resources")?;

        let page_info = pagination.unwrap_or_else(|| athenaeum_core::models::PageInfo {
            page: query.page,
            limit: query.limit,
            total: data.resources.len() as u64,
            total_pages: 1,
        });

        Ok(ResourcePage {
            resources: data.resources,
            page_info,
        })
    }

    /// Fetch a single resource by ID.
    pub async fn get_resource(&self, id: &ResourceId) -> Result<Resource> {
        let (data, _): (ResourceData, _) = self
            .get(&resource_path(id), &[])
            .await
            .with_context(|| format!("Failed to fetch resource {}", id))?;
        Ok(data.into_resource())
    }

    /// Register a resource referencing already-stored files.
    pub async fn create_resource(&self, request: &CreateResourceRequest<'_>) -> Result<Resource> {
        let data: ResourceData = self
            .post_json("/resources", request)
            .await
            .context("Failed to create resource")?;
        Ok(data.into_resource())
    }

    /// Apply a partial metadata update.
    pub async fn update_resource(&self, id: &ResourceId, patch: &ResourcePatch) -> Result<Resource> {
        let data: ResourceData = self
            .patch_json(&resource_path(id), Some(patch))
            .await
            .with_context(|| format!("Failed to update resource {}", id))?;
        Ok(data.into_resource())
    }

    /// Flip the soft-delete flag. The server infers the direction.
    pub async fn toggle_resource_trash(&self, id: &ResourceId) -> Result<Resource> {
        let data: ResourceData = self
            .patch_json::<_, ()>(&format!("{}/trash", resource_path(id)), None)
            .await
            .with_context(|| format!("Failed to toggle trash for resource {}", id))?;
        Ok(data.into_resource())
    }

    /// Remove a resource record for good.
    pub async fn delete_resource(&self, id: &ResourceId) -> Result<()> {
        self.delete(&resource_path(id))
            .await
            .with_context(|| format!("Failed to delete resource {}", id))
    }

    /// Bump a view or download counter. The response body is ignored.
    pub async fn track(&self, kind: TrackKind, id: &ResourceId) -> Result<()> {
        self.post_empty(&format!("{}/{}", resource_path(id), kind.path_segment()))
            .await
            .with_context(|| format!("Failed to track {:?} for resource {}", kind, id))
    }
}
