use std::path::Path;

use opsync_core::OperationStatus;

use crate::commands::common::{
    format_operation_lines, open_engine, operation_to_item, OperationListItem,
};
use crate::error::CliError;

pub async fn run_operations(
    status: Option<OperationStatus>,
    as_json: bool,
    db_path: &Path,
) -> Result<(), CliError> {
    let engine = open_engine(db_path)?;
    let ops = engine.get_sync_operations(status).await?;

    if as_json {
        let items = ops
            .iter()
            .map(operation_to_item)
            .collect::<Vec<OperationListItem>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if ops.is_empty() {
        println!("No sync operations recorded.");
        return Ok(());
    }

    for line in format_operation_lines(&ops) {
        println!("{line}");
    }
    Ok(())
}
