//! Domain logic for content queries
//!
//! - `content_types` - Registry of content types, tables and fields
//! - `query` - Builds ready-to-run queries for a content type

pub mod content_types;
pub mod query;

pub use content_types::{ContentType, ContentTypeConfig, ContentTypeRegistry};
pub use query::QueryService;
