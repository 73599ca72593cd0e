// ABOUTME: Info command implementation
// ABOUTME: Prints size, table count, and approximate row count of the source database

use crate::config::RunSettings;
use crate::error::Result;
use crate::postgres::{database_info, DatabaseInfo};

pub async fn info(settings: &RunSettings) -> Result<DatabaseInfo> {
    let info = database_info(&settings.source, settings.timeout).await?;

    println!("📊 Local Database Information ({}):", settings.source);
    println!("   Size: {}", info.size);
    println!("   Tables: {}", info.tables);
    println!("   Rows: ~{}", info.rows);

    Ok(info)
}
