use std::sync::Arc;

use athenaeum_core::models::ListQuery;

use crate::traits::ResourceCatalog;

/// Pre-submission check for an existing resource with the same title.
///
/// The probe is advisory: when the catalog cannot be queried the guard lets
/// the submission through rather than blocking uploads on a search outage.
/// Only the first `probe_limit` search hits are inspected.
#[derive(Clone)]
pub struct DuplicateTitleGuard {
    catalog: Arc<dyn ResourceCatalog>,
    probe_limit: u32,
}

impl DuplicateTitleGuard {
    pub fn new(catalog: Arc<dyn ResourceCatalog>, probe_limit: u32) -> Self {
        Self {
            catalog,
            probe_limit: probe_limit.max(1),
        }
    }

    /// Returns true when a resource whose title equals `title`, ignoring case
    /// and surrounding whitespace, is among the search hits.
    pub async fn check_duplicate(&self, title: &str) -> bool {
        if title.trim().is_empty() {
            return false;
        }

        let query = ListQuery::title_probe(title, self.probe_limit);
        match self.catalog.list(&query).await {
            Ok(page) => {
                let found = page
                    .resources
                    .iter()
                    .take(self.probe_limit as usize)
                    .any(|resource| resource.title_matches(title));
                tracing::debug!(title = %title.trim(), found, "Duplicate title probe");
                found
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    title = %title.trim(),
                    "Duplicate title probe failed, allowing submission"
                );
                false
            }
        }
    }
}
