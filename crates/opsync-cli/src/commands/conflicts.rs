use std::path::Path;

use opsync_core::{ConflictId, ConflictResolution};

use crate::commands::common::{
    conflict_to_item, format_conflict_lines, open_engine, ConflictListItem,
};
use crate::error::CliError;

pub async fn run_conflicts(
    resolved: Option<bool>,
    as_json: bool,
    db_path: &Path,
) -> Result<(), CliError> {
    let engine = open_engine(db_path)?;
    let conflicts = engine.get_conflicts(resolved).await?;

    if as_json {
        let items = conflicts
            .iter()
            .map(conflict_to_item)
            .collect::<Vec<ConflictListItem>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if conflicts.is_empty() {
        println!("No sync conflicts recorded.");
        return Ok(());
    }

    for line in format_conflict_lines(&conflicts) {
        println!("{line}");
    }
    Ok(())
}

pub async fn run_resolve(
    id: &str,
    resolution: ConflictResolution,
    resolved_by: Option<&str>,
    db_path: &Path,
) -> Result<(), CliError> {
    let conflict_id = id
        .trim()
        .parse::<ConflictId>()
        .map_err(|_| CliError::InvalidConflictId(id.to_string()))?;

    let engine = open_engine(db_path)?;
    engine
        .resolve_conflict(conflict_id, resolution, resolved_by)
        .await?;

    println!("Resolved {conflict_id} as {resolution}");
    Ok(())
}
