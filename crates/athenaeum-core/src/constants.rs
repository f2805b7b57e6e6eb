//! Limits and defaults shared across crates.

/// Largest accepted size for a single file (100 MiB).
pub const MAX_FILE_SIZE_BYTES: u64 = 100 * 1024 * 1024;

/// Most files a single resource may reference.
pub const MAX_FILES_PER_RESOURCE: usize = 20;

/// Page size used when probing the catalog for a duplicate title.
pub const DUPLICATE_CHECK_LIMIT: u32 = 10;

/// Storage namespace that resource files are uploaded into.
pub const DEFAULT_STORAGE_FOLDER: &str = "resources";

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Upper bound on concurrent catalog calls in batch lifecycle operations.
pub const DEFAULT_BATCH_CONCURRENCY: usize = 4;

