// ABOUTME: Wrapper for pg_dump producing custom-format backup files
// ABOUTME: Synthesizes timestamped file names and reports the resulting artifact

use super::process::run_tool;
use super::{BackupArtifact, DumpTool};
use crate::config::ConnectionConfig;
use crate::error::{MigrateError, Result};
use chrono::NaiveDateTime;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

/// Backup file name for `database` taken at `now`: `backup_<db>_<YYYYMMDD_HHMMSS>.dump`.
///
/// Unique only to the second; two backups of the same database within one
/// second produce the same name.
pub fn default_backup_path(database: &str, now: NaiveDateTime) -> PathBuf {
    PathBuf::from(format!(
        "backup_{}_{}.dump",
        database,
        now.format("%Y%m%d_%H%M%S")
    ))
}

/// Runs `pg_dump` in custom archive format (`-Fc`)
#[derive(Debug, Clone, Default)]
pub struct PgDump {
    timeout: Option<Duration>,
}

impl PgDump {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

fn dump_args(source: &ConnectionConfig, dest: &Path) -> Vec<OsString> {
    vec![
        "--host".into(),
        source.host().into(),
        "--port".into(),
        source.port().to_string().into(),
        "--username".into(),
        source.username().into(),
        "--dbname".into(),
        source.database().into(),
        "--format=custom".into(),
        "--file".into(),
        dest.as_os_str().to_owned(),
    ]
}

impl DumpTool for PgDump {
    async fn run_dump(&self, source: &ConnectionConfig, dest: &Path) -> Result<BackupArtifact> {
        tracing::info!("🔄 Creating backup of {} ...", source);

        let program = crate::utils::require_tool("pg_dump")?;
        let args = dump_args(source, dest);
        tracing::debug!("Running {} {:?}", program.display(), args);

        let mut cmd = Command::new(program);
        cmd.args(&args);
        for (env_var, value) in source.to_pg_env_vars() {
            cmd.env(env_var, value);
        }

        let output = run_tool("pg_dump", cmd, self.timeout).await?;
        if !output.status.success() {
            return Err(MigrateError::ProcessFailed {
                tool: "pg_dump",
                status: output.status.to_string(),
                stderr: output.stderr.trim().to_string(),
            });
        }

        let artifact = BackupArtifact::from_path(dest);
        tracing::info!("✓ Backup created successfully: {}", artifact.path.display());
        if let Some(size) = artifact.size_bytes {
            tracing::info!("   File size: {}", crate::utils::format_bytes(size));
        }
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn source() -> ConnectionConfig {
        ConnectionConfig::new("db.local", 6543, "shop", "app", "hunter2").unwrap()
    }

    #[test]
    fn test_default_backup_path_format() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 2)
            .unwrap();
        assert_eq!(
            default_backup_path("ecommerce", now),
            PathBuf::from("backup_ecommerce_20240307_090502.dump")
        );
    }

    #[test]
    fn test_default_backup_path_collides_within_same_second() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_milli_opt(9, 5, 2, 100)
            .unwrap();
        let later = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_milli_opt(9, 5, 2, 900)
            .unwrap();
        assert_eq!(
            default_backup_path("shop", now),
            default_backup_path("shop", later)
        );
    }

    #[test]
    fn test_dump_args_use_custom_format() {
        let args = dump_args(&source(), Path::new("out.dump"));
        assert!(args.contains(&OsString::from("--format=custom")));
        assert!(args.contains(&OsString::from("out.dump")));
        assert!(args.contains(&OsString::from("6543")));
        assert!(args.contains(&OsString::from("shop")));
    }

    #[test]
    fn test_dump_args_never_contain_password() {
        let args = dump_args(&source(), Path::new("out.dump"));
        assert!(args
            .iter()
            .all(|arg| !arg.to_string_lossy().contains("hunter2")));
    }

    // NOTE: This test requires pg_dump and a real PostgreSQL instance
    #[tokio::test]
    #[ignore]
    async fn test_run_dump_creates_artifact() {
        let url = std::env::var("TEST_DATABASE_URL")
            .expect("TEST_DATABASE_URL must be set for integration tests");
        let config = ConnectionConfig::from_url(&url).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("test.dump");

        let artifact = PgDump::default().run_dump(&config, &dest).await.unwrap();

        assert_eq!(artifact.path, dest);
        assert!(dest.exists());
        assert!(artifact.size_bytes.unwrap_or(0) > 0);
    }
}
