// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! SQL execution backend.
//!
//! Runs [`SelectQuery`]s against any database sqlx's `Any` driver supports.
//! The store knows its [`Dialect`] from the connection URL and stamps it on
//! every query it creates, which is what the search backend gate checks:
//!
//! ```text
//! postgres://...  → Dialect::Postgres  (search attached)
//! sqlite:...      → Dialect::Sqlite    (search is a pass-through)
//! mysql://...     → Dialect::MySql     (search is a pass-through)
//! ```
//!
//! ## sqlx Any Driver Quirks
//!
//! MySQL TEXT columns come back as BLOB through the `Any` driver, so text
//! values are read as `String` first and as UTF-8 bytes second.

use sqlx::{any::AnyPoolOptions, AnyPool, Row};
use std::sync::Once;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::SearchError;
use crate::metrics::{self, LatencyTimer};
use crate::query::{Dialect, SelectQuery, SqlParam};

// SQLx `Any` driver requires runtime installation
static INSTALL_DRIVERS: Once = Once::new();

fn install_drivers() {
    INSTALL_DRIVERS.call_once(|| {
        sqlx::any::install_default_drivers();
    });
}

fn backend_error(e: sqlx::Error) -> SearchError {
    SearchError::Backend(e.to_string())
}

pub struct SqlStore {
    pool: AnyPool,
    dialect: Dialect,
}

impl SqlStore {
    /// Connect to `connection_string`. The URL scheme decides the dialect.
    pub async fn new(connection_string: &str) -> Result<Self, SearchError> {
        install_drivers();

        let dialect = Dialect::from_url(connection_string).ok_or_else(|| {
            SearchError::Configuration(format!(
                "unsupported connection string scheme: {}",
                connection_string.split(':').next().unwrap_or_default()
            ))
        })?;

        // In-memory SQLite databases are per-connection
        let max_connections = if dialect == Dialect::Sqlite { 1 } else { 10 };

        let pool = AnyPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .connect(connection_string)
            .await
            .map_err(backend_error)?;

        info!(dialect = dialect.name(), "Connected to database");
        Ok(Self { pool, dialect })
    }

    /// Get a clone of the connection pool.
    pub fn pool(&self) -> AnyPool {
        self.pool.clone()
    }

    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Start a query on `table` for this store's dialect.
    #[must_use]
    pub fn select(&self, table: &str) -> SelectQuery {
        SelectQuery::new(table, self.dialect)
    }

    /// Run a statement without bound parameters. Returns rows affected.
    pub async fn execute(&self, sql: &str) -> Result<u64, SearchError> {
        let result = sqlx::query(sql)
            .execute(&self.pool)
            .await
            .map_err(backend_error)?;
        Ok(result.rows_affected())
    }

    /// Fetch one column of `query` as text, in result order.
    ///
    /// NULL values come back as empty strings.
    pub async fn fetch_text(&self, query: SelectQuery, column: &str) -> Result<Vec<String>, SearchError> {
        let sql = query.select_text(column).to_sql();
        debug!(sql = %sql.sql, params = sql.params.len(), "Executing query");

        let _timer = LatencyTimer::new(self.dialect.name());

        let mut statement = sqlx::query(&sql.sql);
        for param in sql.params {
            statement = match param {
                SqlParam::Text(s) => statement.bind(s),
                SqlParam::Integer(n) => statement.bind(n),
                SqlParam::Numeric(n) => statement.bind(n),
                SqlParam::Boolean(b) => statement.bind(b),
            };
        }

        let rows = match statement.fetch_all(&self.pool).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, dialect = self.dialect.name(), "Query failed");
                metrics::record_query(self.dialect.name(), "error");
                return Err(backend_error(e));
            }
        };
        metrics::record_query(self.dialect.name(), "success");
        metrics::record_query_rows(rows.len());

        let mut values = Vec::with_capacity(rows.len());
        for row in rows {
            // Try String first (Postgres/SQLite TEXT), then bytes (MySQL TEXT via Any)
            let value = match row.try_get::<Option<String>, _>("value") {
                Ok(value) => value,
                Err(_) => row
                    .try_get::<Option<Vec<u8>>, _>("value")
                    .map_err(backend_error)?
                    .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()),
            };
            values.push(value.unwrap_or_default());
        }

        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchOptions;
    use crate::schema::{SchemaRegistry, TableSchema};
    use crate::search::PgSearchExt;

    async fn seeded_sqlite() -> SqlStore {
        let store = SqlStore::new("sqlite::memory:").await.unwrap();
        store
            .execute("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, phone TEXT)")
            .await
            .unwrap();
        store
            .execute(
                "INSERT INTO users (id, name, phone) VALUES \
                 (1, 'Jane-Doe', '123-456-7890'), \
                 (2, 'John Doe', '987.654.3210'), \
                 (3, 'Bob Smith', '555-999-8888')",
            )
            .await
            .unwrap();
        store
    }

    fn schema() -> SchemaRegistry {
        let registry = SchemaRegistry::new();
        registry.register(TableSchema::new("users").columns(["id", "name", "phone"]));
        registry
    }

    #[tokio::test]
    async fn test_unknown_scheme_rejected() {
        let result = SqlStore::new("redis://localhost:6379").await;
        assert!(matches!(result, Err(SearchError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_sqlite_dialect_detected() {
        let store = seeded_sqlite().await;
        assert_eq!(store.dialect(), Dialect::Sqlite);
        assert_eq!(store.select("users").dialect(), Dialect::Sqlite);
    }

    #[tokio::test]
    async fn test_fetch_text_with_bound_filter() {
        let store = seeded_sqlite().await;
        let query = store.select("users").where_eq("id", 2);
        let names = store.fetch_text(query, "name").await.unwrap();
        assert_eq!(names, vec!["John Doe".to_string()]);
    }

    #[tokio::test]
    async fn test_search_on_sqlite_is_passthrough() {
        let store = seeded_sqlite().await;
        let query = store
            .select("users")
            .pg_search(&schema(), Some("Jane Doe"), &["name"], &SearchOptions::default())
            .unwrap();
        assert!(query.filters().is_empty());

        let names = store.fetch_text(query, "name").await.unwrap();
        assert_eq!(names.len(), 3);
    }

    #[tokio::test]
    async fn test_bad_sql_is_backend_error() {
        let store = seeded_sqlite().await;
        let err = store.fetch_text(store.select("missing_table"), "name").await.unwrap_err();
        assert!(matches!(err, SearchError::Backend(_)));
    }
}
