// ABOUTME: Runs PostgreSQL client tools as child processes
// ABOUTME: Captures output, applies the optional timeout, and detects missing binaries

use crate::error::{MigrateError, Result};
use std::io::ErrorKind;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::Command;

/// Captured result of a finished child process
#[derive(Debug)]
pub struct ToolOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Run `cmd` to completion and capture its output.
///
/// The child is killed if `timeout` elapses first. A non-zero exit is NOT an
/// error here; callers decide what the exit status means.
///
/// # Errors
///
/// - `ToolNotInstalled` if the binary cannot be spawned because it does not exist
/// - `Timeout` if the process outlives `timeout`
/// - `Io` for any other spawn or wait failure
pub async fn run_tool(
    tool: &'static str,
    mut cmd: Command,
    timeout: Option<Duration>,
) -> Result<ToolOutput> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = cmd.spawn().map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            MigrateError::ToolNotInstalled { tool }
        } else {
            MigrateError::Io(e)
        }
    })?;

    let output = match timeout {
        Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
            .await
            .map_err(|_| MigrateError::Timeout {
                operation: tool.to_string(),
                after: limit,
            })??,
        None => child.wait_with_output().await?,
    };

    Ok(ToolOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
