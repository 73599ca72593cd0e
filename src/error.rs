// ABOUTME: Error taxonomy for backup, restore, and migration operations
// ABOUTME: Maps each failure class to a distinct process exit code

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("Configuration incomplete: missing or invalid '{field}'")]
    ConfigIncomplete { field: &'static str },

    #[error("Malformed connection URL '{url}': {reason}")]
    MalformedUrl { url: String, reason: String },

    #[error(
        "Source and target point to the same database ({target}).\n\
         Restoring with --clean would overwrite the source."
    )]
    SameDatabase { target: String },

    #[error("Failed to connect to {target}: {message}")]
    ConnectionFailed { target: String, message: String },

    #[error(
        "{tool} not found. Please install PostgreSQL client tools:\n\
         - Ubuntu/Debian: sudo apt-get install postgresql-client\n\
         - macOS: brew install postgresql\n\
         - RHEL/CentOS: sudo yum install postgresql"
    )]
    ToolNotInstalled { tool: &'static str },

    #[error("{tool} failed ({status}): {stderr}")]
    ProcessFailed {
        tool: &'static str,
        status: String,
        stderr: String,
    },

    #[error("Query failed ({query}): {message}")]
    QueryFailed { query: &'static str, message: String },

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: String,
        after: Duration,
    },

    #[error("Backup file not found: {path}")]
    ArtifactNotFound { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MigrateError {
    /// Process exit code for this failure class.
    ///
    /// Configuration errors share code 2 with clap's usage errors.
    pub fn exit_code(&self) -> u8 {
        match self {
            MigrateError::Io(_) => 1,
            MigrateError::ConfigIncomplete { .. }
            | MigrateError::MalformedUrl { .. }
            | MigrateError::SameDatabase { .. }
            | MigrateError::ArtifactNotFound { .. } => 2,
            MigrateError::ConnectionFailed { .. } => 3,
            MigrateError::ToolNotInstalled { .. } => 4,
            MigrateError::ProcessFailed { .. } => 5,
            MigrateError::QueryFailed { .. } => 6,
            MigrateError::Timeout { .. } => 7,
        }
    }
}

pub type Result<T> = std::result::Result<T, MigrateError>;
