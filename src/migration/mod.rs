// ABOUTME: Backup/restore seams and the migration state machine
// ABOUTME: Wraps pg_dump/pg_restore behind narrow traits so the orchestrator can run against fakes

pub mod dump;
pub mod orchestrator;
pub mod process;
pub mod restore;

pub use dump::{default_backup_path, PgDump};
pub use orchestrator::{AbortReason, MigrationRun, MigrationState, Migrator, RunOutcome};
pub use restore::PgRestore;

use crate::config::ConnectionConfig;
use crate::error::{MigrateError, Result};
use std::path::{Path, PathBuf};

/// A dump file produced by a backup and consumed by a restore.
///
/// Never deleted by this crate; the operator owns cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupArtifact {
    pub path: PathBuf,
    pub size_bytes: Option<u64>,
}

impl BackupArtifact {
    /// Reference an existing file, reading its size from the filesystem
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let size_bytes = std::fs::metadata(&path).ok().map(|meta| meta.len());
        Self { path, size_bytes }
    }
}

/// Result of a restore run that got as far as executing `pg_restore`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    Success,
    /// Non-zero exit with diagnostic output, typically "does not exist" notices from `--clean`
    SuccessWithWarnings { status: String, warnings: String },
    /// Non-zero exit without any diagnostic output
    Failed { status: String, stderr: String },
}

/// Which restore outcomes count as a successful restore
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestorePolicy {
    /// Any run that got as far as executing `pg_restore` is accepted
    #[default]
    Lenient,
    /// Only a clean zero exit is accepted
    Strict,
}

impl RestorePolicy {
    /// Apply the policy, turning rejected outcomes into `ProcessFailed`
    pub fn evaluate(&self, outcome: RestoreOutcome) -> Result<RestoreOutcome> {
        match (self, outcome) {
            (_, RestoreOutcome::Success) => Ok(RestoreOutcome::Success),
            (RestorePolicy::Lenient, outcome) => Ok(outcome),
            (RestorePolicy::Strict, RestoreOutcome::SuccessWithWarnings { status, warnings }) => {
                Err(MigrateError::ProcessFailed {
                    tool: "pg_restore",
                    status,
                    stderr: warnings,
                })
            }
            (RestorePolicy::Strict, RestoreOutcome::Failed { status, stderr }) => {
                Err(MigrateError::ProcessFailed {
                    tool: "pg_restore",
                    status,
                    stderr,
                })
            }
        }
    }
}

/// Verifies a database is reachable with the given credentials
#[allow(async_fn_in_trait)]
pub trait ConnectionProber {
    async fn probe(&self, config: &ConnectionConfig) -> Result<()>;
}

/// Produces a dump file from a source database
#[allow(async_fn_in_trait)]
pub trait DumpTool {
    async fn run_dump(&self, source: &ConnectionConfig, dest: &Path) -> Result<BackupArtifact>;
}

/// Loads a dump file into a target database
#[allow(async_fn_in_trait)]
pub trait RestoreTool {
    async fn run_restore(
        &self,
        artifact: &BackupArtifact,
        target: &ConnectionConfig,
    ) -> Result<RestoreOutcome>;
}

impl<T: ConnectionProber> ConnectionProber for &T {
    async fn probe(&self, config: &ConnectionConfig) -> Result<()> {
        (**self).probe(config).await
    }
}

impl<T: DumpTool> DumpTool for &T {
    async fn run_dump(&self, source: &ConnectionConfig, dest: &Path) -> Result<BackupArtifact> {
        (**self).run_dump(source, dest).await
    }
}

impl<T: RestoreTool> RestoreTool for &T {
    async fn run_restore(
        &self,
        artifact: &BackupArtifact,
        target: &ConnectionConfig,
    ) -> Result<RestoreOutcome> {
        (**self).run_restore(artifact, target).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn warnings() -> RestoreOutcome {
        RestoreOutcome::SuccessWithWarnings {
            status: "exit status: 1".to_string(),
            warnings: "pg_restore: warning: errors ignored on restore: 2".to_string(),
        }
    }

    #[test]
    fn test_lenient_policy_accepts_warnings() {
        let outcome = RestorePolicy::Lenient.evaluate(warnings()).unwrap();
        assert_eq!(outcome, warnings());
    }

    #[test]
    fn test_strict_policy_rejects_warnings() {
        let err = RestorePolicy::Strict.evaluate(warnings()).unwrap_err();
        match err {
            MigrateError::ProcessFailed { tool, stderr, .. } => {
                assert_eq!(tool, "pg_restore");
                assert!(stderr.contains("errors ignored"));
            }
            other => panic!("expected ProcessFailed, got {:?}", other),
        }
    }

    fn silent_failure() -> RestoreOutcome {
        RestoreOutcome::Failed {
            status: "exit status: 1".to_string(),
            stderr: String::new(),
        }
    }

    #[test]
    fn test_lenient_policy_accepts_silent_nonzero_exit() {
        let outcome = RestorePolicy::Lenient.evaluate(silent_failure()).unwrap();
        assert_eq!(outcome, silent_failure());
    }

    #[test]
    fn test_strict_policy_rejects_silent_nonzero_exit() {
        let err = RestorePolicy::Strict.evaluate(silent_failure()).unwrap_err();
        assert!(matches!(
            err,
            MigrateError::ProcessFailed {
                tool: "pg_restore",
                ..
            }
        ));
    }

    #[test]
    fn test_both_policies_accept_clean_exit() {
        for policy in [RestorePolicy::Lenient, RestorePolicy::Strict] {
            assert_eq!(
                policy.evaluate(RestoreOutcome::Success).unwrap(),
                RestoreOutcome::Success
            );
        }
    }

    #[test]
    fn test_default_policy_is_lenient() {
        assert_eq!(RestorePolicy::default(), RestorePolicy::Lenient);
    }

    #[test]
    fn test_artifact_from_path_reads_size() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0u8; 2048]).unwrap();
        file.flush().unwrap();

        let artifact = BackupArtifact::from_path(file.path());
        assert_eq!(artifact.size_bytes, Some(2048));

        let missing = BackupArtifact::from_path("/nonexistent/backup.dump");
        assert_eq!(missing.size_bytes, None);
    }
}
