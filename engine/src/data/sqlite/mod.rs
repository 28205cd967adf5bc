//! SQLite query executor
//!
//! Runs compiled select queries against a local SQLite database and returns
//! rows as JSON objects. Values are bound positionally; the query text never
//! contains caller input.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Number, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, ConnectOptions, Row, SqlitePool};
use tracing::log::LevelFilter;

use crate::core::constants::{SQLITE_BUSY_TIMEOUT_SECS, SQLITE_MAX_CONNECTIONS};
use crate::data::error::DataError;
use crate::data::query::SelectBuilder;
use crate::data::sql::SqliteDialect;
use crate::data::traits::{QueryExecutor, ResultRow};

/// SQLite-backed [`QueryExecutor`]
pub struct SqliteExecutor {
    pool: SqlitePool,
}

impl SqliteExecutor {
    /// Open a database by `sqlite:` URL or file path.
    ///
    /// The database must already exist; queries are read-only.
    pub async fn connect(database: &str) -> Result<Self, DataError> {
        let options = if database.starts_with("sqlite:") {
            SqliteConnectOptions::from_str(database)?
        } else {
            SqliteConnectOptions::new().filename(database)
        };
        let options = options
            .busy_timeout(Duration::from_secs(SQLITE_BUSY_TIMEOUT_SECS))
            .log_statements(LevelFilter::Trace);

        let pool = SqlitePoolOptions::new()
            .max_connections(SQLITE_MAX_CONNECTIONS)
            .connect_with(options)
            .await?;

        tracing::debug!(database, "SqliteExecutor connected");
        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the connection pool gracefully
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("SQLite pool closed");
    }
}

#[async_trait]
impl QueryExecutor for SqliteExecutor {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn fetch_all(&self, query: &SelectBuilder) -> Result<Vec<ResultRow>, DataError> {
        let positional = query.positional_with(&SqliteDialect)?;
        tracing::debug!(sql = %positional.sql, values = positional.values.len(), "Executing query");

        let mut statement = sqlx::query(&positional.sql);
        for value in &positional.values {
            statement = statement.bind(value);
        }
        let rows = statement.fetch_all(&self.pool).await?;

        Ok(rows.iter().map(row_to_json).collect())
    }
}

fn row_to_json(row: &SqliteRow) -> ResultRow {
    row.columns()
        .iter()
        .map(|column| {
            let index = column.ordinal();
            (column.name().to_string(), column_value(row, index))
        })
        .collect()
}

/// SQLite columns are dynamically typed; probe storage classes in order
fn column_value(row: &SqliteRow, index: usize) -> Value {
    if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
        return value.map_or(Value::Null, Value::from);
    }
    if let Ok(value) = row.try_get::<f64, _>(index) {
        return Number::from_f64(value).map_or(Value::Null, Value::Number);
    }
    if let Ok(value) = row.try_get::<String, _>(index) {
        return Value::String(value);
    }
    match row.try_get::<Vec<u8>, _>(index) {
        Ok(bytes) => Value::Array(bytes.into_iter().map(Value::from).collect()),
        Err(_) => Value::Null,
    }
}
