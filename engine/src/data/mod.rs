//! Data layer
//!
//! - `filters` - Query-string filter parsing and composition
//! - `query` - Expression tree, backing query builder and `SelectQuery`
//! - `sql` - SQL dialects for placeholder and LIMIT syntax
//! - `sqlite` - SQLite query executor
//! - `traits` - Field registry and executor seams
//! - `error` - Unified error type for the data layer

pub mod error;
pub mod filters;
pub mod query;
pub mod sql;
pub mod sqlite;
pub mod traits;

pub use error::DataError;
pub use query::{SelectBuilder, SelectQuery};
pub use sqlite::SqliteExecutor;
pub use traits::{FieldRegistry, QueryExecutor, ResultRow};
