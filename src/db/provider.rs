//! Schema introspection.
//!
//! Fetches a normalized [`Schema`] from either supported store. The two
//! kinds use different catalog queries but must yield functionally
//! equivalent schemas; the tests pin that equivalence for sqlite.

use crate::config::{DatabaseConfig, DatabaseKind};
use crate::db::{pg_connect_options, sqlite_connect_options, Schema};
use crate::error::{Result, ScoutError};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Row as SqlxRow;
use tracing::debug;

/// Read-only schema provider.
///
/// Opens a scoped connection per fetch and releases it on every exit path;
/// never mutates the store. Results are not cached: each query session
/// re-fetches, so the pipeline stays correct under concurrent schema changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaProvider;

impl SchemaProvider {
    /// Creates a new schema provider.
    pub fn new() -> Self {
        Self
    }

    /// Fetches the schema for the configured store.
    pub async fn fetch(&self, config: &DatabaseConfig) -> Result<Schema> {
        match config.kind {
            DatabaseKind::Sqlite => self.fetch_sqlite(config).await,
            DatabaseKind::Postgres => self.fetch_postgres(config).await,
        }
    }

    async fn fetch_sqlite(&self, config: &DatabaseConfig) -> Result<Schema> {
        let path = config
            .db_path
            .as_deref()
            .ok_or_else(|| ScoutError::config("SQLite requires db_path"))?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(sqlite_connect_options(path, false))
            .await
            .map_err(|e| {
                ScoutError::connection(format!("Failed to open sqlite database '{path}': {e}"))
            })?;

        let schema = sqlite_schema(&pool).await;
        pool.close().await;
        schema
    }

    async fn fetch_postgres(&self, config: &DatabaseConfig) -> Result<Schema> {
        let conn_string = config.postgres_connection_string()?;

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_with(pg_connect_options(&conn_string)?)
            .await
            .map_err(|e| {
                ScoutError::connection(format!(
                    "Failed to connect to {}: {e}",
                    config.display_string()
                ))
            })?;

        let schema = postgres_schema(&pool).await;
        pool.close().await;
        schema
    }
}

async fn sqlite_schema(pool: &SqlitePool) -> Result<Schema> {
    let tables: Vec<String> =
        sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .fetch_all(pool)
            .await
            .map_err(|e| ScoutError::connection(format!("Failed to fetch tables: {e}")))?;

    debug!("sqlite catalog lists {} tables", tables.len());

    let mut schema = Schema::new();
    for table in tables {
        // PRAGMA arguments cannot be bound; the name comes from sqlite_master.
        let rows = sqlx::query(&format!("PRAGMA table_info(\"{table}\")"))
            .fetch_all(pool)
            .await
            .map_err(|e| {
                ScoutError::connection(format!("Failed to fetch columns for {table}: {e}"))
            })?;

        let columns = rows
            .iter()
            .map(|row| row.try_get::<String, _>("name"))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ScoutError::internal(format!("Unexpected table_info row: {e}")))?;

        schema.insert_table(table, columns);
    }

    Ok(schema)
}

async fn postgres_schema(pool: &PgPool) -> Result<Schema> {
    let tables: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT table_name::text
        FROM information_schema.tables
        WHERE table_schema = 'public' AND table_type = 'BASE TABLE'
        ORDER BY table_name
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| ScoutError::connection(format!("Failed to fetch tables: {e}")))?;

    debug!("postgres catalog lists {} tables", tables.len());

    let mut schema = Schema::new();
    for table in tables {
        let columns: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT column_name::text
            FROM information_schema.columns
            WHERE table_schema = 'public' AND table_name = $1
            ORDER BY ordinal_position
            "#,
        )
        .bind(&table)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            ScoutError::connection(format!("Failed to fetch columns for {table}: {e}"))
        })?;

        schema.insert_table(table, columns);
    }

    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn seed_sqlite(path: &str, statements: &[&str]) {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(sqlite_connect_options(path, true))
            .await
            .unwrap();
        for statement in statements {
            sqlx::query(statement).execute(&pool).await.unwrap();
        }
        pool.close().await;
    }

    #[tokio::test]
    async fn test_empty_database_yields_empty_schema() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let schema = SchemaProvider::new()
            .fetch(&crate::config::DatabaseConfig::sqlite(&path))
            .await
            .unwrap();

        assert!(schema.is_empty());
    }

    #[tokio::test]
    async fn test_tables_and_columns_in_catalog_order() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap().to_string();
        seed_sqlite(
            &path,
            &[
                "CREATE TABLE t1 (col_a TEXT, col_b INTEGER)",
                "CREATE TABLE t2 (col_x REAL)",
            ],
        )
        .await;

        let schema = SchemaProvider::new()
            .fetch(&crate::config::DatabaseConfig::sqlite(&path))
            .await
            .unwrap();

        assert_eq!(schema.len(), 2);
        assert_eq!(
            schema.columns("t1").unwrap(),
            &["col_a".to_string(), "col_b".to_string()]
        );
        assert_eq!(schema.columns("t2").unwrap(), &["col_x".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_sqlite_file_is_connection_error() {
        let config = crate::config::DatabaseConfig::sqlite("/nonexistent/dir/missing.db");
        let err = SchemaProvider::new().fetch(&config).await.unwrap_err();
        assert_eq!(err.category(), "Connection Error");
    }
}
