//! In-memory catalog with failure injection, for tests.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::anyhow;
use async_trait::async_trait;
use athenaeum_core::models::{
    AcademicLevel, Category, Department, ListQuery, PageInfo, Resource, ResourceId,
    ResourceMetadata, ResourcePage, ResourcePatch, Visibility,
};
use chrono::Utc;
use tokio::sync::Notify;

use crate::error::{CatalogError, CatalogResult};
use crate::traits::ResourceCatalog;

#[derive(Default)]
struct State {
    resources: Vec<Resource>,
    next_id: u64,
    fail_searches: bool,
    failing_creates: usize,
    create_gate: Option<Arc<CreateGate>>,
    double_toggle: HashSet<ResourceId>,
    created: Vec<(ResourceMetadata, Vec<String>)>,
    list_calls: usize,
    toggle_calls: usize,
    delete_calls: usize,
}

/// Pauses a create call until the test releases it.
#[derive(Default)]
pub struct CreateGate {
    pub reached: Notify,
    pub release: Notify,
}

#[derive(Default)]
pub struct InMemoryCatalog {
    state: Mutex<State>,
}

fn injected(what: &str) -> CatalogError {
    CatalogError::Request {
        source: anyhow!("injected {} failure", what),
    }
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert an active resource with the given title and one file.
    pub fn seed(&self, title: &str) -> Resource {
        let metadata = ResourceMetadata {
            title: title.to_string(),
            description: format!("{} description", title),
            category: Category::Other,
            department: Department::General,
            visibility: Visibility::All,
            academic_level: AcademicLevel::All,
        };
        let mut state = self.state();
        Self::insert(&mut state, &metadata, &["https://cdn.test/seed".to_string()])
    }

    fn insert(state: &mut State, metadata: &ResourceMetadata, file_urls: &[String]) -> Resource {
        state.next_id += 1;
        let now = Utc::now();
        let resource = Resource {
            resource_id: ResourceId::new(format!("res-{}", state.next_id)),
            title: metadata.title.clone(),
            description: metadata.description.clone(),
            category: metadata.category,
            department: metadata.department,
            visibility: metadata.visibility,
            academic_level: metadata.academic_level,
            file_urls: file_urls.to_vec(),
            downloads: 0,
            view_count: 0,
            is_deleted: false,
            deleted_at: None,
            deleted_by: None,
            created_by: None,
            updated_by: None,
            created_at: Some(now),
            updated_at: Some(now),
        };
        state.resources.push(resource.clone());
        resource
    }

    pub fn fail_searches(&self, fail: bool) {
        self.state().fail_searches = fail;
    }

    /// Make the next `n` create calls fail.
    pub fn fail_next_creates(&self, n: usize) {
        self.state().failing_creates = n;
    }

    /// Hold the next create call until `CreateGate::release` is notified.
    pub fn hold_next_create(&self) -> Arc<CreateGate> {
        let gate = Arc::new(CreateGate::default());
        self.state().create_gate = Some(gate.clone());
        gate
    }

    /// Simulate a concurrent toggle: the next toggle of `id` flips twice.
    pub fn toggle_twice_on_next(&self, id: &ResourceId) {
        self.state().double_toggle.insert(id.clone());
    }

    pub fn snapshot(&self, id: &ResourceId) -> Option<Resource> {
        self.state()
            .resources
            .iter()
            .find(|r| &r.resource_id == id)
            .cloned()
    }

    /// Every successful create, in call order.
    pub fn created(&self) -> Vec<(ResourceMetadata, Vec<String>)> {
        self.state().created.clone()
    }

    pub fn len(&self) -> usize {
        self.state().resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn list_calls(&self) -> usize {
        self.state().list_calls
    }

    pub fn toggle_calls(&self) -> usize {
        self.state().toggle_calls
    }

    pub fn delete_calls(&self) -> usize {
        self.state().delete_calls
    }
}

fn flip(resource: &mut Resource) {
    resource.is_deleted = !resource.is_deleted;
    if resource.is_deleted {
        resource.deleted_at = Some(Utc::now());
    } else {
        resource.deleted_at = None;
        resource.deleted_by = None;
    }
}

#[async_trait]
impl ResourceCatalog for InMemoryCatalog {
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
        let gate = self.state().create_gate.take();
        if let Some(gate) = gate {
            gate.reached.notify_one();
            gate.release.notified().await;
        }

        let mut state = self.state();
        if state.failing_creates > 0 {
            state.failing_creates -= 1;
            return Err(injected("create"));
        }
        state
            .created
            .push((metadata.clone(), file_urls.to_vec()));
        Ok(Self::insert(&mut state, metadata, file_urls))
    }

    async fn get(&self, id: &ResourceId) -> CatalogResult<Resource> {
        self.snapshot(id)
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }

    async fn update(&self, id: &ResourceId, patch: &ResourcePatch) -> CatalogResult<Resource> {
        if patch.is_empty() {
            return Err(CatalogError::InvalidInput(
                "Update must change at least one field".to_string(),
            ));
        }
        let mut state = self.state();
        let resource = state
            .resources
            .iter_mut()
            .find(|r| &r.resource_id == id)
            .ok_or_else(|| CatalogError::NotFound(id.clone()))?;

        if let Some(title) = &patch.title {
            resource.title = title.clone();
        }
        if let Some(description) = &patch.description {
            resource.description = description.clone();
        }
        if let Some(category) = patch.category {
            resource.category = category;
        }
        if let Some(department) = patch.department {
            resource.department = department;
        }
        if let Some(visibility) = patch.visibility {
            resource.visibility = visibility;
        }
        if let Some(academic_level) = patch.academic_level {
            resource.academic_level = academic_level;
        }
        resource.updated_at = Some(Utc::now());
        Ok(resource.clone())
    }

    async fn list(&self, query: &ListQuery) -> CatalogResult<ResourcePage> {
        let mut state = self.state();
        state.list_calls += 1;
        if state.fail_searches {
            return Err(injected("search"));
        }

        let needle = query
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        let matching: Vec<&Resource> = state
            .resources
            .iter()
            .filter(|r| query.include_deleted || !r.is_deleted)
            .filter(|r| {
                needle
                    .as_ref()
                    .map_or(true, |n| r.title.to_lowercase().contains(n.as_str()))
            })
            .filter(|r| query.department.map_or(true, |d| r.department == d))
            .filter(|r| query.category.map_or(true, |c| r.category == c))
            .filter(|r| query.visibility.map_or(true, |v| r.visibility == v))
            .collect();

        let limit = query.limit.max(1);
        let page = query.page.max(1);
        let total = matching.len() as u64;
        let resources = matching
            .into_iter()
            .skip(((page - 1) * limit) as usize)
            .take(limit as usize)
            .cloned()
            .collect();

        Ok(ResourcePage {
            resources,
            page_info: PageInfo {
                page,
                limit,
                total,
                total_pages: total.div_ceil(limit as u64) as u32,
            },
        })
    }

    async fn toggle_trash(&self, id: &ResourceId) -> CatalogResult<Resource> {
        let mut state = self.state();
        state.toggle_calls += 1;
        let twice = state.double_toggle.remove(id);
        let resource = state
            .resources
            .iter_mut()
            .find(|r| &r.resource_id == id)
            .ok_or_else(|| CatalogError::NotFound(id.clone()))?;

        flip(resource);
        if twice {
            flip(resource);
        }
        Ok(resource.clone())
    }

    async fn permanently_delete(&self, id: &ResourceId) -> CatalogResult<()> {
        let mut state = self.state();
        state.delete_calls += 1;
        let before = state.resources.len();
        state.resources.retain(|r| &r.resource_id != id);
        if state.resources.len() == before {
            return Err(CatalogError::NotFound(id.clone()));
        }
        Ok(())
    }
}
