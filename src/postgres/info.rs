// ABOUTME: Read-only diagnostic queries for a database
// ABOUTME: Reports size, public table count, and an approximate row count

use super::connection::connect;
use crate::config::ConnectionConfig;
use crate::error::{MigrateError, Result};
use std::fmt;
use std::time::Duration;
use tokio_postgres::types::FromSqlOwned;
use tokio_postgres::Client;

const SIZE_QUERY: &str = "SELECT pg_size_pretty(pg_database_size(current_database()))";

const TABLE_COUNT_QUERY: &str = "SELECT COUNT(*)
     FROM information_schema.tables
     WHERE table_schema = 'public'";

// Tuple activity counters, not live rows: a proxy that is cheap to read
const ROW_ACTIVITY_QUERY: &str = "SELECT COALESCE(SUM(n_tup_ins + n_tup_upd + n_tup_del), 0)::bigint
     FROM pg_stat_user_tables";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseInfo {
    /// Human-readable size, e.g. "7453 kB"
    pub size: String,
    /// Tables (and views) in the `public` schema
    pub tables: i64,
    /// Sum of inserted, updated, and deleted tuples across user tables
    pub rows: i64,
}

impl fmt::Display for DatabaseInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {} tables, ~{} rows",
            self.size, self.tables, self.rows
        )
    }
}

async fn query_scalar<T: FromSqlOwned>(
    client: &Client,
    label: &'static str,
    sql: &str,
) -> Result<T> {
    let failed = |message: String| MigrateError::QueryFailed {
        query: label,
        message,
    };
    let row = client
        .query_one(sql, &[])
        .await
        .map_err(|e| failed(e.to_string()))?;
    row.try_get(0).map_err(|e| failed(e.to_string()))
}

/// Run the three diagnostic queries; any failure fails the whole report
pub async fn fetch_database_info(client: &Client) -> Result<DatabaseInfo> {
    let size = query_scalar(client, "database size", SIZE_QUERY).await?;
    let tables = query_scalar(client, "table count", TABLE_COUNT_QUERY).await?;
    let rows = query_scalar(client, "row count", ROW_ACTIVITY_QUERY).await?;

    Ok(DatabaseInfo { size, tables, rows })
}

/// Connect to `config` and collect its [`DatabaseInfo`]
pub async fn database_info(
    config: &ConnectionConfig,
    timeout: Option<Duration>,
) -> Result<DatabaseInfo> {
    let client = connect(config, timeout).await?;
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fetch_database_info(&client))
            .await
            .map_err(|_| MigrateError::Timeout {
                operation: format!("querying database info for {}", config),
                after: limit,
            })?,
        None => fetch_database_info(&client).await,
    }
}
