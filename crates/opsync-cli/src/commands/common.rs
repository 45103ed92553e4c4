use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use opsync_core::notify::{HttpNotificationEmitter, NotificationEmitter, NullNotificationEmitter};
use opsync_core::{
    Row, SqliteRowStore, SyncConflict, SyncEngine, SyncEngineConfig, SyncOperation,
};
use serde::Serialize;
use serde_json::Value;

use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct OperationListItem {
    pub id: String,
    pub kind: String,
    pub entity_type: String,
    pub entity_id: String,
    pub status: String,
    pub retry_count: u32,
    pub queued_at: String,
    pub last_error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConflictListItem {
    pub id: String,
    pub entity_type: String,
    pub entity_id: String,
    pub field: String,
    pub local_value: Value,
    pub remote_value: Value,
    pub detected_at: String,
    pub resolved: bool,
    pub resolution: Option<String>,
    pub resolved_by: Option<String>,
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> PathBuf {
    cli_db_path
        .or_else(|| env::var_os("OPSYNC_DB_PATH").map(PathBuf::from))
        .unwrap_or_else(default_db_path)
}

pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("opsync")
        .join("opsync.db")
}

/// Open the engine over the sqlite database at `db_path`.
///
/// CLI drains are always explicit `opsync sync` runs, so background drains
/// stay disabled.
pub fn open_engine(db_path: &Path) -> Result<SyncEngine, CliError> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let store = Arc::new(SqliteRowStore::open(db_path)?);
    let config = SyncEngineConfig {
        auto_drain: false,
        ..SyncEngineConfig::default()
    };
    Ok(SyncEngine::new(store, notifier_from_env()?, config))
}

fn notifier_from_env() -> Result<Arc<dyn NotificationEmitter>, CliError> {
    match env::var("OPSYNC_WEBHOOK_URL") {
        Ok(url) if !url.trim().is_empty() => {
            tracing::info!("Webhook notifications enabled");
            Ok(Arc::new(HttpNotificationEmitter::new(url)?))
        }
        _ => Ok(Arc::new(NullNotificationEmitter)),
    }
}

pub fn parse_payload(raw: &str) -> Result<Row, CliError> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(payload) => Ok(payload),
        _ => Err(CliError::PayloadNotAnObject),
    }
}

pub fn normalize_entity_id(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyEntityId)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn operation_to_item(op: &SyncOperation) -> OperationListItem {
    OperationListItem {
        id: op.id.as_str(),
        kind: op.kind.to_string(),
        entity_type: op.entity_type.to_string(),
        entity_id: op.entity_id.clone(),
        status: op.status.to_string(),
        retry_count: op.retry_count,
        queued_at: format_timestamp(op.timestamp),
        last_error: op.last_error.clone(),
    }
}

pub fn conflict_to_item(conflict: &SyncConflict) -> ConflictListItem {
    ConflictListItem {
        id: conflict.id.as_str(),
        entity_type: conflict.entity_type.to_string(),
        entity_id: conflict.entity_id.clone(),
        field: conflict.field.clone(),
        local_value: conflict.local_value.clone(),
        remote_value: conflict.remote_value.clone(),
        detected_at: format_timestamp(conflict.timestamp),
        resolved: conflict.resolved,
        resolution: conflict.resolution.map(|resolution| resolution.to_string()),
        resolved_by: conflict.resolved_by.clone(),
    }
}

pub fn format_operation_lines(ops: &[SyncOperation]) -> Vec<String> {
    ops.iter()
        .map(|op| {
            let short_id = op.id.as_str().chars().take(13).collect::<String>();
            let target = format!("{}/{}", op.entity_type, op.entity_id);
            let mut line = format!(
                "{short_id:<13}  {:<6}  {target:<28}  {:<9}  {}",
                op.kind.to_string(),
                op.status.to_string(),
                format_timestamp(op.timestamp)
            );
            if let Some(error) = &op.last_error {
                line.push_str(&format!("  {error}"));
            }
            line
        })
        .collect()
}

pub fn format_conflict_lines(conflicts: &[SyncConflict]) -> Vec<String> {
    conflicts
        .iter()
        .map(|conflict| {
            let short_id = conflict.id.as_str().chars().take(13).collect::<String>();
            let target = format!(
                "{}/{}.{}",
                conflict.entity_type, conflict.entity_id, conflict.field
            );
            let state = if conflict.resolved {
                conflict
                    .resolution
                    .map_or_else(|| "resolved".to_string(), |resolution| resolution.to_string())
            } else {
                "unresolved".to_string()
            };
            format!(
                "{short_id:<13}  {target:<36}  {state:<15}  local={} remote={}",
                conflict.local_value, conflict.remote_value
            )
        })
        .collect()
}

pub fn format_timestamp(timestamp_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms).map_or_else(
        || timestamp_ms.to_string(),
        |date_time| date_time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}
