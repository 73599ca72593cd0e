// ABOUTME: Wrapper for pg_restore loading a custom-format backup into a target database
// ABOUTME: Drops conflicting objects first and classifies the exit into a restore outcome

use super::process::{run_tool, ToolOutput};
use super::{BackupArtifact, RestoreOutcome, RestoreTool};
use crate::config::ConnectionConfig;
use crate::error::{MigrateError, Result};
use std::ffi::OsString;
use std::time::Duration;
use tokio::process::Command;

/// Runs `pg_restore --clean --if-exists`
#[derive(Debug, Clone, Default)]
pub struct PgRestore {
    timeout: Option<Duration>,
}

impl PgRestore {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

fn restore_args(artifact: &BackupArtifact, target: &ConnectionConfig) -> Vec<OsString> {
    vec![
        "--host".into(),
        target.host().into(),
        "--port".into(),
        target.port().to_string().into(),
        "--username".into(),
        target.username().into(),
        "--dbname".into(),
        target.database().into(),
        "--clean".into(),
        "--if-exists".into(),
        artifact.path.as_os_str().to_owned(),
    ]
}

/// Classify a finished `pg_restore` run.
///
/// `--clean` routinely makes pg_restore exit non-zero with "errors ignored on
/// restore" for objects that did not exist yet, so a non-zero exit that comes
/// with diagnostic text is reported as warnings rather than failure.
pub fn classify_restore(output: &ToolOutput) -> RestoreOutcome {
    if output.status.success() {
        return RestoreOutcome::Success;
    }

    let stderr = output.stderr.trim().to_string();
    if stderr.is_empty() {
        RestoreOutcome::Failed {
            status: output.status.to_string(),
            stderr,
        }
    } else {
        RestoreOutcome::SuccessWithWarnings {
            status: output.status.to_string(),
            warnings: stderr,
        }
    }
}

impl RestoreTool for PgRestore {
    async fn run_restore(
        &self,
        artifact: &BackupArtifact,
        target: &ConnectionConfig,
    ) -> Result<RestoreOutcome> {
        if !artifact.path.exists() {
            return Err(MigrateError::ArtifactNotFound {
                path: artifact.path.display().to_string(),
            });
        }

        tracing::info!(
            "🔄 Restoring {} into {} ...",
            artifact.path.display(),
            target
        );

        let program = crate::utils::require_tool("pg_restore")?;
        let args = restore_args(artifact, target);
        tracing::debug!("Running {} {:?}", program.display(), args);

        let mut cmd = Command::new(program);
        cmd.args(&args);
        for (env_var, value) in target.to_pg_env_vars() {
            cmd.env(env_var, value);
        }

        let output = run_tool("pg_restore", cmd, self.timeout).await?;
        let outcome = classify_restore(&output);
        match &outcome {
            RestoreOutcome::Success => tracing::info!("✓ Database restored successfully"),
            RestoreOutcome::SuccessWithWarnings { warnings, .. } => {
                tracing::warn!("⚠️ Restore completed with warnings: {}", warnings)
            }
            RestoreOutcome::Failed { status, .. } => {
                tracing::warn!("⚠️ pg_restore exited with {} and no output", status)
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[cfg(unix)]
    fn output(code: i32, stderr: &str) -> ToolOutput {
        use std::os::unix::process::ExitStatusExt;
        ToolOutput {
            status: std::process::ExitStatus::from_raw(code << 8),
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_classify_zero_exit_is_success() {
        assert_eq!(classify_restore(&output(0, "")), RestoreOutcome::Success);
        // Output on a clean exit is ignored
        assert_eq!(
            classify_restore(&output(0, "pg_restore: connecting")),
            RestoreOutcome::Success
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_classify_nonzero_with_text_is_warning() {
        let outcome = classify_restore(&output(
            1,
            "pg_restore: warning: errors ignored on restore: 3\n",
        ));
        match outcome {
            RestoreOutcome::SuccessWithWarnings { warnings, .. } => {
                assert_eq!(warnings, "pg_restore: warning: errors ignored on restore: 3")
            }
            other => panic!("expected warnings, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_classify_nonzero_without_text_is_failure() {
        assert!(matches!(
            classify_restore(&output(1, "  \n")),
            RestoreOutcome::Failed { .. }
        ));
    }

    #[test]
    fn test_restore_args_drop_existing_objects() {
        let target = ConnectionConfig::new("target", 5432, "db", "u", "hunter2").unwrap();
        let artifact = BackupArtifact {
            path: PathBuf::from("backup.dump"),
            size_bytes: None,
        };
        let args = restore_args(&artifact, &target);

        assert!(args.contains(&OsString::from("--clean")));
        assert!(args.contains(&OsString::from("--if-exists")));
        assert_eq!(args.last(), Some(&OsString::from("backup.dump")));
        assert!(args
            .iter()
            .all(|arg| !arg.to_string_lossy().contains("hunter2")));
    }

    #[tokio::test]
    async fn test_run_restore_missing_artifact() {
        let target = ConnectionConfig::new("target", 5432, "db", "u", "p").unwrap();
        let artifact = BackupArtifact {
            path: PathBuf::from("/nonexistent/backup_missing.dump"),
            size_bytes: None,
        };
        let err = PgRestore::default()
            .run_restore(&artifact, &target)
            .await
            .unwrap_err();
        assert!(matches!(err, MigrateError::ArtifactNotFound { .. }));
    }
}
