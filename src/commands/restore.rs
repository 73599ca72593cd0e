// ABOUTME: Restore command implementation
// ABOUTME: Loads an existing backup file into the target database

use crate::config::{RunSettings, TargetOptions, TARGET_FLAGS};
use crate::error::{MigrateError, Result};
use crate::migration::{BackupArtifact, PgRestore, RestoreOutcome, RestoreTool};
use std::path::Path;

/// Restore `backup_file` into the target.
///
/// Both a backup file and a target are required; when either is missing
/// nothing is invoked. The configured restore policy decides whether warnings
/// count as success.
pub async fn restore(
    settings: &RunSettings,
    backup_file: Option<&Path>,
    target: &TargetOptions,
) -> Result<RestoreOutcome> {
    let (backup_file, target) = match (backup_file, target.resolve()?) {
        (Some(backup_file), Some(target)) => (backup_file, target),
        (backup_file, _) => {
            let (field, message) = missing_input(backup_file.is_some());
            tracing::error!("❌ {}", message);
            return Err(MigrateError::ConfigIncomplete { field });
        }
    };

    let artifact = BackupArtifact::from_path(backup_file);
    let outcome = PgRestore::new(settings.timeout)
        .run_restore(&artifact, &target)
        .await?;
    settings.restore_policy.evaluate(outcome)
}

/// Name the first missing input and describe what restore needs
fn missing_input(has_backup_file: bool) -> (&'static str, String) {
    let field = if has_backup_file {
        "target-url"
    } else {
        "backup-file"
    };
    let message = format!(
        "Both --backup-file and a target are required for restore; give the target with {}",
        TARGET_FLAGS
    );
    (field, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConnectionConfig;

    fn settings() -> RunSettings {
        RunSettings::new(ConnectionConfig::new("localhost", 5432, "db", "u", "p").unwrap())
    }

    #[tokio::test]
    async fn test_restore_requires_target() {
        let err = restore(
            &settings(),
            Some(Path::new("backup.dump")),
            &TargetOptions::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            MigrateError::ConfigIncomplete {
                field: "target-url"
            }
        ));
    }

    #[test]
    fn test_missing_input_names_every_target_flag() {
        let (field, message) = missing_input(true);
        assert_eq!(field, "target-url");
        for flag in [
            "--target-url",
            "--target-host",
            "--target-db",
            "--target-user",
            "--target-password",
        ] {
            assert!(message.contains(flag), "{} missing from {}", flag, message);
        }

        let (field, _) = missing_input(false);
        assert_eq!(field, "backup-file");
    }

    #[tokio::test]
    async fn test_restore_requires_backup_file() {
        let target = TargetOptions {
            url: Some("postgresql://u:p@target:5432/db".to_string()),
            ..Default::default()
        };
        let err = restore(&settings(), None, &target).await.unwrap_err();
        assert!(matches!(
            err,
            MigrateError::ConfigIncomplete {
                field: "backup-file"
            }
        ));
    }

    #[tokio::test]
    async fn test_restore_missing_file_never_runs_pg_restore() {
        let target = TargetOptions {
            url: Some("postgresql://u:p@target:5432/db".to_string()),
            ..Default::default()
        };
        let err = restore(
            &settings(),
            Some(Path::new("/nonexistent/backup.dump")),
            &target,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, MigrateError::ArtifactNotFound { .. }));
    }
}
