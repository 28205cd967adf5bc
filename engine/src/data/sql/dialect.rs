//! SQL dialect trait for multi-database support
//!
//! This trait defines the interface for generating database-specific SQL syntax.

/// SQL dialect trait for generating database-specific SQL
///
/// Compiled queries use named placeholders (`:status_0`) internally. A dialect
/// decides how those are written when the query is rendered for execution,
/// and how result limits are expressed.
pub trait SqlDialect: Send + Sync {
    /// Get the dialect name
    fn name(&self) -> &'static str;

    /// Generate a parameter placeholder for the given index (1-based)
    ///
    /// - SQLite/DuckDB: Always returns "?"
    /// - PostgreSQL: Returns "$1", "$2", etc.
    fn placeholder(&self, index: usize) -> String;

    /// Generate LIMIT clause
    fn limit(&self, limit: u32) -> String {
        format!("LIMIT {}", limit)
    }
}
