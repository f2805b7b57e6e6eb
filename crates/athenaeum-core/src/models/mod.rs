//! Data models for the resource pipeline
//!
//! Catalog records, upload metadata, pending files and listing queries.

mod enums;
mod file;
mod query;
mod resource;

pub use enums::*;
pub use file::*;
pub use query::*;
pub use resource::*;
