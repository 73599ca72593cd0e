// ABOUTME: Migration state machine sequencing connection checks, backup, and restore
// ABOUTME: Fails fast at the first failing step and leaves the backup file for manual cleanup

use super::{
    BackupArtifact, ConnectionProber, DumpTool, PgDump, PgRestore, RestoreOutcome, RestorePolicy,
    RestoreTool,
};
use crate::config::{ConnectionConfig, RunSettings};
use crate::error::{MigrateError, Result};
use crate::postgres::PgProber;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationState {
    Start,
    CheckingSource,
    CheckingTarget,
    BackingUp,
    Restoring,
    Done,
    Aborted,
}

impl MigrationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, MigrationState::Done | MigrationState::Aborted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    SourceUnreachable,
    TargetUnreachable,
    BackupFailed,
    RestoreFailed,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            AbortReason::SourceUnreachable => "source unreachable",
            AbortReason::TargetUnreachable => "target unreachable",
            AbortReason::BackupFailed => "backup failed",
            AbortReason::RestoreFailed => "restore failed",
        };
        f.write_str(reason)
    }
}

/// How a migration run ended
#[derive(Debug)]
pub enum RunOutcome {
    Done {
        artifact: BackupArtifact,
        restore: RestoreOutcome,
    },
    Aborted {
        reason: AbortReason,
        error: MigrateError,
        /// Present when the backup succeeded before the abort
        artifact: Option<BackupArtifact>,
    },
}

type Abort = (AbortReason, MigrateError, Option<BackupArtifact>);

/// Record of one orchestrator invocation: every state visited, and how it ended
#[derive(Debug)]
pub struct MigrationRun {
    history: Vec<MigrationState>,
    outcome: RunOutcome,
}

impl MigrationRun {
    /// Final state, always `Done` or `Aborted`
    pub fn state(&self) -> MigrationState {
        match self.outcome {
            RunOutcome::Done { .. } => MigrationState::Done,
            RunOutcome::Aborted { .. } => MigrationState::Aborted,
        }
    }

    pub fn history(&self) -> &[MigrationState] {
        &self.history
    }

    pub fn outcome(&self) -> &RunOutcome {
        &self.outcome
    }

    pub fn abort_reason(&self) -> Option<AbortReason> {
        match &self.outcome {
            RunOutcome::Aborted { reason, .. } => Some(*reason),
            RunOutcome::Done { .. } => None,
        }
    }

    /// The backup file, if the run got past the backup step
    pub fn artifact(&self) -> Option<&BackupArtifact> {
        match &self.outcome {
            RunOutcome::Done { artifact, .. } => Some(artifact),
            RunOutcome::Aborted { artifact, .. } => artifact.as_ref(),
        }
    }

    pub fn into_result(self) -> Result<BackupArtifact> {
        match self.outcome {
            RunOutcome::Done { artifact, .. } => Ok(artifact),
            RunOutcome::Aborted { error, .. } => Err(error),
        }
    }
}

/// Sequences source check → target check → backup → restore.
///
/// No step is retried and nothing is rolled back: a failed restore can leave
/// the target partially modified, and the backup file always stays on disk.
pub struct Migrator<P, D, R> {
    prober: P,
    dump: D,
    restore: R,
    policy: RestorePolicy,
}

impl Migrator<PgProber, PgDump, PgRestore> {
    /// Migrator backed by the real driver and client tools
    pub fn postgres(settings: &RunSettings) -> Self {
        Migrator::new(
            PgProber::new(settings.timeout),
            PgDump::new(settings.timeout),
            PgRestore::new(settings.timeout),
        )
        .with_policy(settings.restore_policy)
    }
}

impl<P, D, R> Migrator<P, D, R>
where
    P: ConnectionProber,
    D: DumpTool,
    R: RestoreTool,
{
    pub fn new(prober: P, dump: D, restore: R) -> Self {
        Self {
            prober,
            dump,
            restore,
            policy: RestorePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RestorePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Migrate `source` into `target`, writing the backup to `dest`
    pub async fn run(
        &self,
        source: &ConnectionConfig,
        target: &ConnectionConfig,
        dest: &Path,
    ) -> MigrationRun {
        tracing::info!("🚀 Starting full database migration: {} → {}", source, target);

        let mut history = vec![MigrationState::Start];
        let outcome = match self.drive(&mut history, source, target, dest).await {
            Ok((artifact, restore)) => {
                tracing::info!("✓ Migration completed successfully!");
                tracing::info!(
                    "🗑️ You can now delete the backup file: {}",
                    artifact.path.display()
                );
                RunOutcome::Done { artifact, restore }
            }
            Err((reason, error, artifact)) => {
                history.push(MigrationState::Aborted);
                tracing::error!("❌ Migration aborted ({}): {}", reason, error);
                if let Some(artifact) = &artifact {
                    tracing::info!("Backup file kept at {}", artifact.path.display());
                }
                RunOutcome::Aborted {
                    reason,
                    error,
                    artifact,
                }
            }
        };

        MigrationRun { history, outcome }
    }

    async fn drive(
        &self,
        history: &mut Vec<MigrationState>,
        source: &ConnectionConfig,
        target: &ConnectionConfig,
        dest: &Path,
    ) -> std::result::Result<(BackupArtifact, RestoreOutcome), Abort> {
        tracing::info!("1. Testing connections...");
        history.push(MigrationState::CheckingSource);
        self.prober
            .probe(source)
            .await
            .map_err(|e| (AbortReason::SourceUnreachable, e, None))?;

        history.push(MigrationState::CheckingTarget);
        self.prober
            .probe(target)
            .await
            .map_err(|e| (AbortReason::TargetUnreachable, e, None))?;

        tracing::info!("2. Creating backup...");
        history.push(MigrationState::BackingUp);
        let artifact = self
            .dump
            .run_dump(source, dest)
            .await
            .map_err(|e| (AbortReason::BackupFailed, e, None))?;

        tracing::info!("3. Restoring to target...");
        history.push(MigrationState::Restoring);
        let restore = self
            .restore
            .run_restore(&artifact, target)
            .await
            .and_then(|outcome| self.policy.evaluate(outcome));
        let restore = match restore {
            Ok(restore) => restore,
            Err(e) => return Err((AbortReason::RestoreFailed, e, Some(artifact))),
        };

        history.push(MigrationState::Done);
        Ok((artifact, restore))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(MigrationState::Done.is_terminal());
        assert!(MigrationState::Aborted.is_terminal());
        assert!(!MigrationState::Start.is_terminal());
        assert!(!MigrationState::Restoring.is_terminal());
    }

    #[test]
    fn test_abort_reason_display() {
        assert_eq!(AbortReason::SourceUnreachable.to_string(), "source unreachable");
        assert_eq!(AbortReason::TargetUnreachable.to_string(), "target unreachable");
        assert_eq!(AbortReason::BackupFailed.to_string(), "backup failed");
        assert_eq!(AbortReason::RestoreFailed.to_string(), "restore failed");
    }
}
