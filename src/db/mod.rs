//! Database layer for sqlscout.
//!
//! Two components touch the store: [`SchemaProvider`] introspects the schema
//! read-only, and [`SqlExecutionTool`] is the only component permitted to
//! mutate persistent state. Both acquire scoped connections inside a single
//! call and release them on every exit path.

mod executor;
mod provider;
mod schema;
mod types;

pub use executor::{SqlExecutionTool, SqlRequest};
pub use provider::SchemaProvider;
pub use schema::{Schema, SCHEMA_KEY};
pub use types::{ExecStatus, ExecutionResult, Row, Value};

use crate::error::{Result, ScoutError};
use sqlx::postgres::PgConnectOptions;
use sqlx::sqlite::SqliteConnectOptions;

/// Parses a keyword/value PostgreSQL connection string into connect options.
///
/// Accepts the `host=<h> port=<p> dbname=<d> user=<u> password=<pw>` format
/// produced by [`DatabaseConfig::postgres_connection_string`].
///
/// [`DatabaseConfig::postgres_connection_string`]: crate::config::DatabaseConfig::postgres_connection_string
pub(crate) fn pg_connect_options(conn_string: &str) -> Result<PgConnectOptions> {
    let mut options = PgConnectOptions::new();

    for pair in conn_string.split_whitespace() {
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            ScoutError::config(format!("Invalid connection string segment: '{pair}'"))
        })?;

        options = match key {
            "host" => options.host(value),
            "port" => {
                let port: u16 = value.parse().map_err(|_| {
                    ScoutError::config(format!("Invalid port in connection string: '{value}'"))
                })?;
                options.port(port)
            }
            "dbname" => options.database(value),
            "user" => options.username(value),
            "password" => options.password(value),
            _ => {
                return Err(ScoutError::config(format!(
                    "Unknown connection string parameter: '{key}'"
                )))
            }
        };
    }

    Ok(options)
}

/// Builds sqlite connect options for the given database file path.
///
/// `create_if_missing` controls whether a missing file is created; the schema
/// provider keeps it off so introspection stays read-only.
pub(crate) fn sqlite_connect_options(path: &str, create_if_missing: bool) -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(create_if_missing)
}
