use async_trait::async_trait;
use athenaeum_api_client::ApiClient;
use athenaeum_core::models::{
    CreateResourceRequest, ListQuery, Resource, ResourceId, ResourceMetadata, ResourcePage,
    ResourcePatch,
};

use crate::error::{CatalogError, CatalogResult};
use crate::traits::ResourceCatalog;

/// Catalog backed by the portal's REST API.
#[derive(Clone, Debug)]
pub struct HttpResourceCatalog {
    client: ApiClient,
}

impl HttpResourceCatalog {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

#[async_trait]
impl ResourceCatalog for HttpResourceCatalog {
    async fn create(
        &self,
        metadata: &ResourceMetadata,
        file_urls: &[String],
    ) -> CatalogResult<Resource> {
        if file_urls.is_empty() {
            return Err(CatalogError::InvalidInput(
                "A resource must reference at least one file".to_string(),
            ));
        }

        let request = CreateResourceRequest {
            metadata,
            file_urls,
        };
        let resource = self
            .client
            .create_resource(&request)
            .await
            .map_err(|e| CatalogError::from_request(None, e))?;

        tracing::info!(
            resource_id = %resource.resource_id,
            title = %resource.title,
            file_count = resource.file_urls.len(),
            "Resource created"
        );
        Ok(resource)
    }

    async fn get(&self, id: &ResourceId) -> CatalogResult<Resource> {
        self.client
            .get_resource(id)
            .await
            .map_err(|e| CatalogError::from_request(Some(id), e))
    }

    async fn update(&self, id: &ResourceId, patch: &ResourcePatch) -> CatalogResult<Resource> {
        if patch.is_empty() {
            return Err(CatalogError::InvalidInput(
                "Update must change at least one field".to_string(),
            ));
        }
        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(CatalogError::InvalidInput("Title must not be blank".to_string()));
            }
        }

        self.client
            .update_resource(id, patch)
            .await
            .map_err(|e| CatalogError::from_request(Some(id), e))
    }

    async fn list(&self, query: &ListQuery) -> CatalogResult<ResourcePage> {
        self.client
            .search_resources(query)
            .await
            .map_err(|e| CatalogError::from_request(None, e))
    }

    async fn toggle_trash(&self, id: &ResourceId) -> CatalogResult<Resource> {
        self.client
            .toggle_resource_trash(id)
            .await
            .map_err(|e| CatalogError::from_request(Some(id), e))
    }

    async fn permanently_delete(&self, id: &ResourceId) -> CatalogResult<()> {
        self.client
            .delete_resource(id)
            .await
            .map_err(|e| CatalogError::from_request(Some(id), e))?;
        tracing::info!(resource_id = %id, "Resource permanently deleted");
        Ok(())
    }
}
