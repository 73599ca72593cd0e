// ABOUTME: Utility functions for tool discovery, validation, and formatting
// ABOUTME: Locates PostgreSQL client tools and guards against migrating a database onto itself

use crate::config::ConnectionConfig;
use crate::error::{MigrateError, Result};
use std::path::PathBuf;
use which::which;

/// Client tools needed by backup and restore
pub const REQUIRED_TOOLS: [&str; 2] = ["pg_dump", "pg_restore"];

/// Locate a PostgreSQL client tool on `PATH`
///
/// # Errors
///
/// Returns `ToolNotInstalled` if the binary cannot be found.
///
/// # Examples
///
/// ```no_run
/// # use postgres_migrator::utils::require_tool;
/// let pg_dump = require_tool("pg_dump")?;
/// println!("Using {}", pg_dump.display());
/// # Ok::<(), postgres_migrator::error::MigrateError>(())
/// ```
pub fn require_tool(tool: &'static str) -> Result<PathBuf> {
    which(tool).map_err(|_| MigrateError::ToolNotInstalled { tool })
}

/// Names of required client tools that are missing from `PATH`
pub fn missing_tools() -> Vec<&'static str> {
    REQUIRED_TOOLS
        .iter()
        .copied()
        .filter(|tool| which(tool).is_err())
        .collect()
}

/// Refuse to migrate a database onto itself.
///
/// Host comparison is case-insensitive; port, database, and user must match exactly.
///
/// # Errors
///
/// Returns `SameDatabase` if source and target identify the same database.
pub fn validate_source_target_different(
    source: &ConnectionConfig,
    target: &ConnectionConfig,
) -> Result<()> {
    if source.host().eq_ignore_ascii_case(target.host())
        && source.port() == target.port()
        && source.database() == target.database()
        && source.username() == target.username()
    {
        return Err(MigrateError::SameDatabase {
            target: format!("{}@{}", target.username(), target),
        });
    }
    Ok(())
}

/// Format bytes into human-readable size
///
/// # Examples
///
/// ```
/// # use postgres_migrator::utils::format_bytes;
/// assert_eq!(format_bytes(1024), "1.0 KB");
/// assert_eq!(format_bytes(1536), "1.5 KB");
/// assert_eq!(format_bytes(1073741824), "1.0 GB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    format!("{:.1} {}", size, UNITS[unit_idx])
}
