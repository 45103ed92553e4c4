use std::path::Path;

use crate::commands::common::open_engine;
use crate::error::CliError;

pub async fn run_sync(db_path: &Path) -> Result<(), CliError> {
    let engine = open_engine(db_path)?;
    engine.start_sync().await?;

    let status = engine.get_sync_status().await?;
    println!(
        "Sync completed: {} operations total, {} pending, {} failed, {} in conflict",
        status.total_operations,
        status.pending_operations,
        status.failed_operations,
        status.conflict_operations
    );
    Ok(())
}

pub async fn run_retry(db_path: &Path) -> Result<(), CliError> {
    let engine = open_engine(db_path)?;
    let reset = engine.retry_failed_operations().await?;

    if reset == 0 {
        println!("No failed operations to retry.");
        return Ok(());
    }

    engine.start_sync().await?;
    println!("Retried {reset} failed operations");
    Ok(())
}

pub async fn run_clear(older_than_days: Option<i64>, db_path: &Path) -> Result<(), CliError> {
    let engine = open_engine(db_path)?;
    let removed = engine.clear_sync_history(older_than_days).await?;
    println!("Removed {removed} records from sync history");
    Ok(())
}
