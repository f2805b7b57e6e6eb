//! Resource lifecycle transitions
//!
//! A resource is either active or trashed; permanent deletion removes the
//! record. The catalog only offers a toggle, so each transition here reads the
//! current state first and toggles only when needed:
//!
//! - `trash` on a trashed resource is a no-op, as is `restore` on an active one
//! - if the toggle lands in the wrong state, someone else toggled in between
//!   and the call fails with `ConcurrentToggle`
//! - `permanently_delete` is only accepted for trashed resources
//!
//! Batch variants run transitions with bounded concurrency and report every
//! id individually. One failure never aborts the rest of the batch.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use athenaeum_core::models::{LifecycleState, Resource, ResourceId};
use athenaeum_core::ErrorMetadata;
use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::error::LifecycleError;
use crate::traits::ResourceCatalog;

#[derive(Clone)]
pub struct ResourceLifecycle {
    catalog: Arc<dyn ResourceCatalog>,
    concurrency: usize,
}

impl ResourceLifecycle {
    pub fn new(catalog: Arc<dyn ResourceCatalog>, concurrency: usize) -> Self {
        Self {
            catalog,
            concurrency: concurrency.max(1),
        }
    }

    /// Move a resource to the trash. Idempotent.
    pub async fn trash(&self, id: &ResourceId) -> Result<Resource, LifecycleError> {
        self.transition(id, LifecycleState::Trashed).await
    }

    /// Bring a trashed resource back. Idempotent.
    pub async fn restore(&self, id: &ResourceId) -> Result<Resource, LifecycleError> {
        self.transition(id, LifecycleState::Active).await
    }

    /// Remove a trashed resource for good. Active resources are refused
    /// without contacting the delete endpoint.
    pub async fn permanently_delete(&self, id: &ResourceId) -> Result<(), LifecycleError> {
        let current = self.catalog.get(id).await?;
        if current.lifecycle_state() != LifecycleState::Trashed {
            tracing::debug!(resource_id = %id, "Refusing to delete active resource");
            return Err(LifecycleError::NotTrashed(id.clone()));
        }

        self.catalog.permanently_delete(id).await?;
        Ok(())
    }

    pub async fn trash_many(&self, ids: &[ResourceId]) -> BatchReport<Resource> {
        self.run_batch(ids, move |id| async move { self.trash(&id).await })
            .await
    }

    pub async fn restore_many(&self, ids: &[ResourceId]) -> BatchReport<Resource> {
        self.run_batch(ids, move |id| async move { self.restore(&id).await })
            .await
    }

    pub async fn delete_many(&self, ids: &[ResourceId]) -> BatchReport<()> {
        self.run_batch(ids, move |id| async move { self.permanently_delete(&id).await })
            .await
    }

    async fn transition(
        &self,
        id: &ResourceId,
        target: LifecycleState,
    ) -> Result<Resource, LifecycleError> {
        let current = self.catalog.get(id).await?;
        if current.lifecycle_state() == target {
            tracing::debug!(resource_id = %id, state = %target, "Resource already in target state");
            return Ok(current);
        }

        let toggled = self.catalog.toggle_trash(id).await?;
        if toggled.lifecycle_state() != target {
            tracing::warn!(
                resource_id = %id,
                expected = %target,
                actual = %toggled.lifecycle_state(),
                "Resource toggled concurrently"
            );
            return Err(LifecycleError::ConcurrentToggle {
                id: id.clone(),
                expected: target,
            });
        }

        tracing::info!(resource_id = %id, state = %target, "Resource lifecycle updated");
        Ok(toggled)
    }

    async fn run_batch<T, F, Fut>(&self, ids: &[ResourceId], op: F) -> BatchReport<T>
    where
        F: Fn(ResourceId) -> Fut,
        Fut: Future<Output = Result<T, LifecycleError>>,
    {
        let mut seen = HashSet::new();
        let unique: Vec<ResourceId> = ids
            .iter()
            .filter(|id| seen.insert((*id).clone()))
            .cloned()
            .collect();

        let outcomes = stream::iter(unique)
            .map(|id| {
                let fut = op(id.clone());
                async move {
                    let result = fut.await;
                    BatchOutcome { id, result }
                }
            })
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        let report = BatchReport { outcomes };
        tracing::info!(
            total = report.outcomes.len(),
            failed = report.failure_count(),
            "Batch lifecycle operation finished"
        );
        report
    }
}

/// Result of one id within a batch.
#[derive(Debug)]
pub struct BatchOutcome<T> {
    pub id: ResourceId,
    pub result: Result<T, LifecycleError>,
}

/// Per-id results of a batch, in request order with duplicates removed.
#[derive(Debug)]
pub struct BatchReport<T> {
    pub outcomes: Vec<BatchOutcome<T>>,
}

impl<T> BatchReport<T> {
    pub fn succeeded(&self) -> impl Iterator<Item = &ResourceId> {
        self.outcomes
            .iter()
            .filter(|o| o.result.is_ok())
            .map(|o| &o.id)
    }

    pub fn failed(&self) -> impl Iterator<Item = (&ResourceId, &LifecycleError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (&o.id, e)))
    }

    pub fn failure_count(&self) -> usize {
        self.failed().count()
    }

    pub fn is_success(&self) -> bool {
        self.failure_count() == 0
    }

    /// Serializable per-id summary.
    pub fn summary(&self) -> Vec<BatchItemSummary> {
        self.outcomes
            .iter()
            .map(|o| match &o.result {
                Ok(_) => BatchItemSummary {
                    id: o.id.clone(),
                    status: "ok",
                    code: None,
                    error: None,
                },
                Err(e) => BatchItemSummary {
                    id: o.id.clone(),
                    status: "error",
                    code: Some(e.error_code()),
                    error: Some(e.client_message()),
                },
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchItemSummary {
    pub id: ResourceId,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
