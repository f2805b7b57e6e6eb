//! Catalog abstraction trait

use async_trait::async_trait;
use athenaeum_core::models::{
    ListQuery, Resource, ResourceId, ResourceMetadata, ResourcePage, ResourcePatch,
};

use crate::error::CatalogResult;

/// Authoritative store of resource records.
///
/// Implementations must refuse to create a resource without files, and must
/// treat `toggle_trash` as a flip of the current `is_deleted` flag. Callers
/// wanting a specific direction go through `ResourceLifecycle`.
#[async_trait]
pub trait ResourceCatalog: Send + Sync {
    /// Register a resource referencing already-stored files, in order.
    async fn create(
        &self,
        metadata: &ResourceMetadata,
        file_urls: &[String],
    ) -> CatalogResult<Resource>;

    async fn get(&self, id: &ResourceId) -> CatalogResult<Resource>;

    async fn update(&self, id: &ResourceId, patch: &ResourcePatch) -> CatalogResult<Resource>;

    /// One page of resources matching the filters. Visibility rules are
    /// applied by the catalog, not by the caller.
    async fn list(&self, query: &ListQuery) -> CatalogResult<ResourcePage>;

    async fn toggle_trash(&self, id: &ResourceId) -> CatalogResult<Resource>;

    async fn permanently_delete(&self, id: &ResourceId) -> CatalogResult<()>;
}
