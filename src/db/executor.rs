//! SQL execution tool.
//!
//! Validates, executes and reports on a single SQL statement. This is the
//! only component allowed to mutate the store, and the only one whose
//! failures are absorbed into a result value: [`execute`] never returns an
//! error and never panics.
//!
//! [`execute`]: SqlExecutionTool::execute

use crate::db::{
    pg_connect_options, sqlite_connect_options, ExecutionResult, Row, Value,
};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Column as SqlxColumn, Row as SqlxRow, TypeInfo};
use tracing::debug;

/// Request to execute one SQL statement.
///
/// Carries the raw connection parameters from the pipeline context; `db_type`
/// stays a string here because validating it is part of the tool's contract.
#[derive(Debug, Clone)]
pub struct SqlRequest {
    /// The SQL statement text.
    pub sql: String,
    /// Database kind: "sqlite" or "postgres".
    pub db_type: String,
    /// SQLite database file path.
    pub db_path: Option<String>,
    /// PostgreSQL keyword/value connection string.
    pub conn_string: Option<String>,
}

impl SqlRequest {
    /// Creates a sqlite request.
    pub fn sqlite(sql: impl Into<String>, db_path: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            db_type: "sqlite".to_string(),
            db_path: Some(db_path.into()),
            conn_string: None,
        }
    }

    /// Creates a postgres request.
    pub fn postgres(sql: impl Into<String>, conn_string: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            db_type: "postgres".to_string(),
            db_path: None,
            conn_string: Some(conn_string.into()),
        }
    }
}

/// Executes SQL statements against the configured store.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlExecutionTool;

impl SqlExecutionTool {
    /// Creates a new execution tool.
    pub fn new() -> Self {
        Self
    }

    /// Validates and executes one statement.
    ///
    /// Input validation short-circuits to an error result without opening a
    /// connection. SELECT statements return their rows in `data`; any other
    /// statement is committed and returns `data: null`. Store-side failures
    /// leave the transaction uncommitted and come back as
    /// `Error executing query: ...` results.
    pub async fn execute(&self, request: &SqlRequest) -> ExecutionResult {
        if request.sql.trim().is_empty() {
            return ExecutionResult::error("Invalid input parameters: SQL text is empty");
        }

        match request.db_type.to_lowercase().as_str() {
            "sqlite" => match request.db_path.as_deref() {
                Some(path) if !path.is_empty() => self.execute_sqlite(path, &request.sql).await,
                _ => ExecutionResult::error("SQLite requires db_path."),
            },
            "postgres" | "postgresql" => match request.conn_string.as_deref() {
                Some(conn) if !conn.is_empty() => self.execute_postgres(conn, &request.sql).await,
                _ => ExecutionResult::error("PostgreSQL requires conn_string."),
            },
            other => ExecutionResult::error(format!(
                "Unsupported db_type '{other}'. Use 'sqlite' or 'postgres'."
            )),
        }
    }

    async fn execute_sqlite(&self, path: &str, sql: &str) -> ExecutionResult {
        debug!(db = "sqlite", "executing statement");

        let pool = match SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(sqlite_connect_options(path, true))
            .await
        {
            Ok(pool) => pool,
            Err(e) => return ExecutionResult::error(format!("Error connecting to database: {e}")),
        };

        let result = if is_select(sql) {
            match sqlx::query(sql).fetch_all(&pool).await {
                Ok(rows) => {
                    let data: Vec<Row> = rows.iter().map(convert_sqlite_row).collect();
                    ExecutionResult::success(Some(data))
                }
                Err(e) => ExecutionResult::error(format!("Error executing query: {e}")),
            }
        } else {
            match pool.begin().await {
                Ok(mut tx) => match sqlx::query(sql).execute(&mut *tx).await {
                    Ok(_) => match tx.commit().await {
                        Ok(()) => ExecutionResult::success(None),
                        Err(e) => ExecutionResult::error(format!("Error executing query: {e}")),
                    },
                    // Dropping the transaction rolls it back.
                    Err(e) => ExecutionResult::error(format!("Error executing query: {e}")),
                },
                Err(e) => ExecutionResult::error(format!("Error executing query: {e}")),
            }
        };

        pool.close().await;
        result
    }

    async fn execute_postgres(&self, conn_string: &str, sql: &str) -> ExecutionResult {
        debug!(db = "postgres", "executing statement");

        let options = match pg_connect_options(conn_string) {
            Ok(options) => options,
            Err(e) => return ExecutionResult::error(format!("Error connecting to database: {e}")),
        };

        let pool = match PgPoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
        {
            Ok(pool) => pool,
            Err(e) => return ExecutionResult::error(format!("Error connecting to database: {e}")),
        };

        let result = if is_select(sql) {
            match sqlx::query(sql).fetch_all(&pool).await {
                Ok(rows) => {
                    let data: Vec<Row> = rows.iter().map(convert_pg_row).collect();
                    ExecutionResult::success(Some(data))
                }
                Err(e) => ExecutionResult::error(format!("Error executing query: {e}")),
            }
        } else {
            match pool.begin().await {
                Ok(mut tx) => match sqlx::query(sql).execute(&mut *tx).await {
                    Ok(_) => match tx.commit().await {
                        Ok(()) => ExecutionResult::success(None),
                        Err(e) => ExecutionResult::error(format!("Error executing query: {e}")),
                    },
                    Err(e) => ExecutionResult::error(format!("Error executing query: {e}")),
                },
                Err(e) => ExecutionResult::error(format!("Error executing query: {e}")),
            }
        };

        pool.close().await;
        result
    }
}

/// Returns true if the trimmed statement starts with the SELECT keyword.
fn is_select(sql: &str) -> bool {
    sql.trim().to_lowercase().starts_with("select")
}

/// Converts a sqlx SqliteRow into a driver-agnostic row.
fn convert_sqlite_row(row: &SqliteRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_sqlite_value(row, i, col.type_info().name()))
        .collect()
}

fn convert_sqlite_value(row: &SqliteRow, index: usize, type_name: &str) -> Value {
    match type_name.to_uppercase().as_str() {
        "BOOLEAN" => row
            .try_get::<Option<bool>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bool)
            .unwrap_or(Value::Null),

        "INTEGER" | "INT" | "INT4" | "INT8" | "BIGINT" => row
            .try_get::<Option<i64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Int)
            .unwrap_or(Value::Null),

        "REAL" | "NUMERIC" => row
            .try_get::<Option<f64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Float)
            .unwrap_or(Value::Null),

        "BLOB" => row
            .try_get::<Option<Vec<u8>>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bytes)
            .unwrap_or(Value::Null),

        // TEXT and anything else decodes as a string.
        _ => row
            .try_get::<Option<String>, _>(index)
            .ok()
            .flatten()
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}

/// Converts a sqlx PgRow into a driver-agnostic row.
fn convert_pg_row(row: &PgRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_pg_value(row, i, col.type_info().name()))
        .collect()
}

fn convert_pg_value(row: &PgRow, index: usize, type_name: &str) -> Value {
    match type_name.to_uppercase().as_str() {
        "BOOL" | "BOOLEAN" => row
            .try_get::<Option<bool>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bool)
            .unwrap_or(Value::Null),

        "INT2" | "SMALLINT" => row
            .try_get::<Option<i16>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::Int(v as i64))
            .unwrap_or(Value::Null),

        "INT4" | "INT" | "INTEGER" => row
            .try_get::<Option<i32>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::Int(v as i64))
            .unwrap_or(Value::Null),

        "INT8" | "BIGINT" => row
            .try_get::<Option<i64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Int)
            .unwrap_or(Value::Null),

        "FLOAT4" | "REAL" => row
            .try_get::<Option<f32>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::Float(v as f64))
            .unwrap_or(Value::Null),

        "FLOAT8" | "DOUBLE PRECISION" => row
            .try_get::<Option<f64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Float)
            .unwrap_or(Value::Null),

        "BYTEA" => row
            .try_get::<Option<Vec<u8>>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bytes)
            .unwrap_or(Value::Null),

        _ => row
            .try_get::<Option<String>, _>(index)
            .ok()
            .flatten()
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}
