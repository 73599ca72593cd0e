// ABOUTME: Test command implementation
// ABOUTME: Probes the source database and, when given, the target database

use crate::config::{RunSettings, TargetOptions};
use crate::error::Result;
use crate::postgres::test_connection;
use crate::utils::missing_tools;

/// Probe the source and, if a target is given, the target.
///
/// Both probes run even if the first fails; the first failure is returned.
/// Missing client tools are reported but don't fail the check.
pub async fn test_connections(settings: &RunSettings, target: &TargetOptions) -> Result<()> {
    let missing = missing_tools();
    if !missing.is_empty() {
        tracing::warn!(
            "Missing PostgreSQL client tools: {} (backup/restore will not work)",
            missing.join(", ")
        );
    }

    tracing::info!("🔍 Testing local database connection...");
    let source_result = test_connection(&settings.source, settings.timeout).await;

    let target_result = match target.resolve() {
        Ok(Some(target)) => {
            tracing::info!("🔍 Testing target database connection...");
            test_connection(&target, settings.timeout).await
        }
        Ok(None) => Ok(()),
        Err(e) => Err(e),
    };

    source_result.and(target_result)
}
