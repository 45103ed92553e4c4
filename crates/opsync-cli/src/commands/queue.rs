use std::path::Path;

use opsync_core::{EntityType, OperationKind, OperationSource};

use crate::commands::common::{normalize_entity_id, open_engine, parse_payload};
use crate::error::CliError;

pub async fn run_queue(
    kind: OperationKind,
    entity_type: EntityType,
    entity_id: &str,
    payload_raw: &str,
    db_path: &Path,
) -> Result<(), CliError> {
    let entity_id = normalize_entity_id(entity_id)?;
    let payload = parse_payload(payload_raw)?;

    let engine = open_engine(db_path)?;
    let id = engine
        .queue_operation(kind, entity_type, entity_id, payload, OperationSource::Local)
        .await?;

    println!("{id}");
    Ok(())
}
