//! Collaborator traits for the query compiler
//!
//! The compiler consumes a [`FieldRegistry`] to decide which fields exist and
//! hands finished queries to a [`QueryExecutor`]. Both are implemented outside
//! the filter engine so other schema sources and databases can plug in.

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::query::SelectBuilder;

// ============================================================================
// Field Registry Trait
// ============================================================================

/// Source of truth for which fields a content type exposes
pub trait FieldRegistry: Send + Sync {
    /// Whether `field` is a queryable column of `content_type`
    fn field_exists(&self, content_type: &str, field: &str) -> bool;
}

// ============================================================================
// Query Executor Trait
// ============================================================================

/// One result row, column name → JSON value
pub type ResultRow = serde_json::Map<String, serde_json::Value>;

/// Runs compiled select queries against a database
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Backend name for logs
    fn backend_name(&self) -> &'static str;

    /// Execute `query` and return every row
    async fn fetch_all(&self, query: &SelectBuilder) -> Result<Vec<ResultRow>, DataError>;
}
