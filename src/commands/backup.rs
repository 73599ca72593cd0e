// ABOUTME: Backup command implementation
// ABOUTME: Dumps the source database and reports what was written

use crate::config::RunSettings;
use crate::error::Result;
use crate::migration::{default_backup_path, BackupArtifact, DumpTool, PgDump};
use crate::postgres::database_info;
use chrono::Local;
use std::path::PathBuf;

/// Back up the source database to `backup_file`, or to a timestamped file
/// in the working directory.
///
/// After a successful dump the source's size and table counts are printed;
/// failing to read them does not fail the backup.
pub async fn backup(
    settings: &RunSettings,
    backup_file: Option<PathBuf>,
) -> Result<BackupArtifact> {
    let dest = backup_file.unwrap_or_else(|| {
        default_backup_path(settings.source.database(), Local::now().naive_local())
    });

    let artifact = PgDump::new(settings.timeout)
        .run_dump(&settings.source, &dest)
        .await?;

    match database_info(&settings.source, settings.timeout).await {
        Ok(info) => println!("📊 Database Info: {}", info),
        Err(e) => tracing::warn!("Could not read database info: {}", e),
    }

    Ok(artifact)
}
