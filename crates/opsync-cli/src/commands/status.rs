use std::path::Path;

use crate::commands::common::{format_timestamp, open_engine};
use crate::error::CliError;

pub async fn run_status(as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let engine = open_engine(db_path)?;
    let status = engine.get_sync_status().await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("Total operations:    {}", status.total_operations);
    println!("Pending:             {}", status.pending_operations);
    println!("Failed:              {}", status.failed_operations);
    println!("In conflict:         {}", status.conflict_operations);
    println!(
        "Sync in progress:    {}",
        if status.sync_in_progress { "yes" } else { "no" }
    );
    println!(
        "Last sync:           {}",
        status
            .last_sync
            .map_or_else(|| "never".to_string(), format_timestamp)
    );
    Ok(())
}
