//! Unified error type for data layer
//!
//! The query compiler itself never fails on caller input; these errors come
//! from configuration, registry lookups and query execution.

use thiserror::Error;

/// Unified error type for data layer operations
#[derive(Error, Debug)]
pub enum DataError {
    /// SQLite database error (query execution)
    #[error("SQLite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    /// Requested content type is not registered
    #[error("Unknown content type: {0}")]
    UnknownContentType(String),

    /// Expression references a placeholder with no bound value
    #[error("Placeholder :{0} has no bound value")]
    UnboundParameter(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DataError {
    /// Check if this is a connection-related error that might be transient
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Sqlite(e) => {
                matches!(
                    e,
                    sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
                )
            }
            _ => false,
        }
    }
}
