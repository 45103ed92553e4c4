//! Sync status snapshot model

use serde::{Deserialize, Serialize};

/// Derived counts snapshot written after each drain cycle.
///
/// Not authoritative — the operation log is. The newest snapshot (by
/// `recorded_at`) is the operative one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatus {
    /// All operations currently in the log
    pub total_operations: u64,
    /// Operations awaiting (re-)execution
    pub pending_operations: u64,
    /// Operations parked after exhausting their retry budget
    pub failed_operations: u64,
    /// Operations awaiting manual conflict resolution
    pub conflict_operations: u64,
    /// Whether a drain is running right now
    pub sync_in_progress: bool,
    /// End of the most recent drain (Unix ms); `None` when never synced
    pub last_sync: Option<i64>,
    /// When this snapshot was taken (Unix ms)
    pub recorded_at: i64,
}
