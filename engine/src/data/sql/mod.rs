//! SQL abstraction layer for multi-database support
//!
//! This module provides abstractions for generating SQL that works across
//! different database backends (SQLite, PostgreSQL, DuckDB).

mod dialect;
mod duckdb_dialect;
mod postgres_dialect;
mod sqlite_dialect;

use serde::{Deserialize, Serialize};

pub use dialect::SqlDialect;
pub use duckdb_dialect::DuckdbDialect;
pub use postgres_dialect::PostgresDialect;
pub use sqlite_dialect::SqliteDialect;

/// Database backend identifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Sqlite,
    Postgres,
    Duckdb,
}

impl Backend {
    /// Get the SQL dialect for this backend
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Backend::Sqlite => &SqliteDialect,
            Backend::Postgres => &PostgresDialect,
            Backend::Duckdb => &DuckdbDialect,
        }
    }

    /// Get the backend name
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Sqlite => "sqlite",
            Backend::Postgres => "postgres",
            Backend::Duckdb => "duckdb",
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_dialect_names_match() {
        for backend in [Backend::Sqlite, Backend::Postgres, Backend::Duckdb] {
            assert_eq!(backend.dialect().name(), backend.name());
        }
    }

    #[test]
    fn test_backend_serde() {
        let backend: Backend = serde_json::from_str(r#""postgres""#).unwrap();
        assert_eq!(backend, Backend::Postgres);
        assert_eq!(Backend::default(), Backend::Sqlite);
    }
}
