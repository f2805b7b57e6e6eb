//! Athenaeum Catalog Library
//!
//! The resource catalog is the authoritative store of resource records. This
//! crate exposes it as the `ResourceCatalog` trait with an HTTP implementation,
//! and builds on it:
//!
//! - `ResourceLifecycle`: explicit, idempotent trash/restore/delete transitions
//!   with per-id batch reporting
//! - `DuplicateTitleGuard`: fail-open duplicate title probe
//! - `AnalyticsTracker`: fire-and-forget view/download counters

pub mod analytics;
pub mod error;
pub mod guard;
pub mod http;
pub mod lifecycle;
#[cfg(any(test, feature = "testing"))]
pub mod memory;
pub mod traits;

// Re-export commonly used types
pub use analytics::{AnalyticsSink, AnalyticsTracker};
pub use athenaeum_api_client::TrackKind;
pub use error::{CatalogError, CatalogResult, LifecycleError};
pub use guard::DuplicateTitleGuard;
pub use http::HttpResourceCatalog;
pub use lifecycle::{BatchItemSummary, BatchOutcome, BatchReport, ResourceLifecycle};
pub use traits::ResourceCatalog;
