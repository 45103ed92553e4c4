//! Sync orchestrator: drains the operation log against the remote store.
//!
//! `SyncEngine` is a cheap-clone handle over shared inner state. It owns the
//! strategy registry and the single in-progress guard; the operation log and
//! conflict ledger are only ever mutated here or through the public
//! `resolve_conflict` / `retry_failed_operations` / `clear_sync_history`
//! entry points.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::{
    ConflictId, ConflictResolution, EntityType, OperationId, OperationKind, OperationSource,
    OperationStatus, SyncConflict, SyncOperation, SyncStatus, DEFAULT_MAX_RETRIES,
};
use crate::notify::NotificationEmitter;
use crate::store::{Row, RowStore};
use crate::sync::backoff;
use crate::sync::detector::detect_field_conflicts;
use crate::sync::strategy::{merge_field, StrategyRegistry};
use crate::util::{compact_text, now_ms};

/// Operation log table.
pub const OPERATIONS_TABLE: &str = "Sync_Operations";
/// Conflict ledger table.
pub const CONFLICTS_TABLE: &str = "Sync_Conflicts";
/// Status snapshot table.
pub const STATUS_TABLE: &str = "Sync_Status";

/// Default retention window for completed operations and resolved conflicts.
pub const DEFAULT_RETENTION_DAYS: i64 = 30;

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1_000;

/// Tunables injected at engine construction.
#[derive(Clone, Debug)]
pub struct SyncEngineConfig {
    /// Per-entity-type resolution strategies
    pub strategies: StrategyRegistry,
    /// Retry budget stamped onto queued operations
    pub max_retries: u32,
    /// Retention window for `clear_sync_history` when no override is given
    pub retention_days: i64,
    /// Schedule a background drain when work is queued and no drain runs
    pub auto_drain: bool,
}

impl Default for SyncEngineConfig {
    fn default() -> Self {
        Self {
            strategies: StrategyRegistry::default(),
            max_retries: DEFAULT_MAX_RETRIES,
            retention_days: DEFAULT_RETENTION_DAYS,
            auto_drain: true,
        }
    }
}

/// Public entry point of the sync subsystem.
#[derive(Clone)]
pub struct SyncEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    store: Arc<dyn RowStore>,
    notifier: Arc<dyn NotificationEmitter>,
    config: SyncEngineConfig,
    sync_in_progress: AtomicBool,
}

enum ApplyOutcome {
    Completed,
    ManualConflict(String),
}

impl SyncEngine {
    pub fn new(
        store: Arc<dyn RowStore>,
        notifier: Arc<dyn NotificationEmitter>,
        config: SyncEngineConfig,
    ) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                store,
                notifier,
                config,
                sync_in_progress: AtomicBool::new(false),
            }),
        }
    }

    /// Queue a mutation for application to the remote store.
    ///
    /// Always succeeds synchronously once the payload validates, regardless
    /// of remote reachability; the caller never waits on remote I/O. When no
    /// drain is running (and `auto_drain` is on) one is scheduled in the
    /// background.
    pub async fn queue_operation(
        &self,
        kind: OperationKind,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        payload: Row,
        source: OperationSource,
    ) -> Result<OperationId> {
        entity_type.validate_payload(&payload)?;

        let op = SyncOperation::new(kind, entity_type, entity_id, payload, source)
            .with_max_retries(self.inner.config.max_retries);
        let id = op.id;
        self.put_operation(&op).await?;
        debug!("Queued {} operation {id} for {}/{}", op.kind, entity_type, op.entity_id);

        if self.inner.config.auto_drain {
            self.spawn_drain_if_idle();
        }
        Ok(id)
    }

    /// Run one drain cycle. Fails fast with `AlreadyInProgress` when a drain
    /// is running — the single concurrency guard of the subsystem.
    pub async fn start_sync(&self) -> Result<()> {
        if !self.try_begin_drain() {
            return Err(Error::AlreadyInProgress);
        }
        let result = self.drain().await;
        self.end_drain();
        result
    }

    /// Manually settle one ledger conflict and write the winning value to
    /// that single field on the remote row.
    ///
    /// Does not retry the originating operation.
    pub async fn resolve_conflict(
        &self,
        conflict_id: ConflictId,
        resolution: ConflictResolution,
        resolved_by: Option<&str>,
    ) -> Result<()> {
        let row = self
            .inner
            .store
            .read_one(CONFLICTS_TABLE, &conflict_id.as_str())
            .await?
            .ok_or_else(|| Error::NotFound(format!("conflict {conflict_id}")))?;
        let mut conflict: SyncConflict = from_row(row)?;

        if conflict.resolved {
            return Err(Error::InvalidInput(format!(
                "conflict {conflict_id} is already resolved"
            )));
        }

        let value = match resolution {
            ConflictResolution::Local => conflict.local_value.clone(),
            ConflictResolution::Remote => conflict.remote_value.clone(),
            ConflictResolution::Merge => {
                merge_field(&conflict.local_value, &conflict.remote_value)
            }
            ConflictResolution::LastWriteWins => {
                return Err(Error::InvalidInput(
                    "'last_write_wins' is not a manual resolution".to_string(),
                ))
            }
        };

        let table = conflict.entity_type.table();
        let mut patch = Row::new();
        patch.insert(conflict.field.clone(), value);
        let written = self
            .inner
            .store
            .update(table, &conflict.entity_id, patch)
            .await?;
        if !written {
            warn!(
                "Remote row {table}/{} is gone; conflict {conflict_id} resolved without a field write",
                conflict.entity_id
            );
        }

        conflict.mark_resolved(resolution, resolved_by.unwrap_or("user"), now_ms());
        self.put_conflict(&conflict).await?;
        info!(
            "Conflict {conflict_id} on {}/{}.{} resolved as {resolution}",
            conflict.entity_type, conflict.entity_id, conflict.field
        );
        Ok(())
    }

    /// The most recent status snapshot, with the live in-progress flag.
    pub async fn get_sync_status(&self) -> Result<SyncStatus> {
        let snapshots = self.inner.store.read(STATUS_TABLE).await?;
        let mut status = snapshots
            .into_iter()
            .map(from_row::<SyncStatus>)
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .max_by_key(|snapshot| snapshot.recorded_at)
            .unwrap_or_default();

        status.sync_in_progress = self.inner.sync_in_progress.load(Ordering::SeqCst);
        Ok(status)
    }

    /// Conflict ledger entries, optionally filtered by resolved state.
    pub async fn get_conflicts(&self, resolved: Option<bool>) -> Result<Vec<SyncConflict>> {
        let mut conflicts = self
            .inner
            .store
            .read(CONFLICTS_TABLE)
            .await?
            .into_iter()
            .map(from_row::<SyncConflict>)
            .collect::<Result<Vec<_>>>()?;

        if let Some(resolved) = resolved {
            conflicts.retain(|conflict| conflict.resolved == resolved);
        }
        conflicts.sort_by_key(|conflict| conflict.timestamp);
        Ok(conflicts)
    }

    /// Operation log entries, optionally filtered by status.
    pub async fn get_sync_operations(
        &self,
        status: Option<OperationStatus>,
    ) -> Result<Vec<SyncOperation>> {
        let mut ops = self.load_operations().await?;
        if let Some(status) = status {
            ops.retain(|op| op.status == status);
        }
        ops.sort_by_key(|op| op.timestamp);
        Ok(ops)
    }

    /// Reset every failed operation to pending with a fresh retry budget and
    /// schedule a drain if none is running. Returns how many were reset.
    pub async fn retry_failed_operations(&self) -> Result<usize> {
        let mut reset = 0;
        for mut op in self.load_operations().await? {
            if op.status != OperationStatus::Failed {
                continue;
            }
            op.reset_for_retry();
            self.put_operation(&op).await?;
            reset += 1;
        }

        if reset > 0 {
            info!("Reset {reset} failed operations to pending");
            if self.inner.config.auto_drain {
                self.spawn_drain_if_idle();
            }
        }
        Ok(reset)
    }

    /// Purge completed operations, resolved conflicts, and stale status
    /// snapshots older than the cutoff. Pending/failed/conflict operations,
    /// unresolved conflicts, and the newest snapshot are never touched.
    /// Returns how many records were removed.
    pub async fn clear_sync_history(&self, older_than_days: Option<i64>) -> Result<u64> {
        let days = older_than_days.unwrap_or(self.inner.config.retention_days);
        if days < 0 {
            return Err(Error::InvalidInput(format!(
                "retention window must be non-negative, got {days} days"
            )));
        }
        let cutoff = now_ms() - days * MS_PER_DAY;
        let mut removed = 0;

        for op in self.load_operations().await? {
            let expired = op.status == OperationStatus::Completed
                && op.completed_at.map_or(false, |at| at < cutoff);
            if expired && self
                .inner
                .store
                .delete(OPERATIONS_TABLE, &op.id.as_str())
                .await?
            {
                removed += 1;
            }
        }

        for conflict in self.get_conflicts(Some(true)).await? {
            let expired = conflict.resolved_at.map_or(false, |at| at < cutoff);
            if expired && self
                .inner
                .store
                .delete(CONFLICTS_TABLE, &conflict.id.as_str())
                .await?
            {
                removed += 1;
            }
        }

        removed += self.compact_status_snapshots(cutoff).await?;

        info!("Sync history compaction removed {removed} records older than {days} days");
        Ok(removed)
    }

    /// Drop status snapshots older than the cutoff, always keeping the
    /// newest one so `get_sync_status` stays meaningful.
    async fn compact_status_snapshots(&self, cutoff: i64) -> Result<u64> {
        let snapshots = self.inner.store.read(STATUS_TABLE).await?;
        let recorded_at =
            |row: &Row| row.get("recorded_at").and_then(Value::as_i64).unwrap_or(0);
        let Some(newest) = snapshots.iter().map(recorded_at).max() else {
            return Ok(0);
        };

        let mut removed = 0;
        for row in &snapshots {
            let at = recorded_at(row);
            if at >= newest || at >= cutoff {
                continue;
            }
            if let Some(id) = crate::store::row_id(row) {
                if self.inner.store.delete(STATUS_TABLE, &id).await? {
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Drain loop
    // ------------------------------------------------------------------

    fn try_begin_drain(&self) -> bool {
        self.inner
            .sync_in_progress
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn end_drain(&self) {
        self.inner.sync_in_progress.store(false, Ordering::SeqCst);
    }

    fn spawn_drain_if_idle(&self) {
        if !self.try_begin_drain() {
            return;
        }
        let engine = self.clone();
        tokio::spawn(async move {
            if let Err(error) = engine.drain().await {
                warn!("Background sync drain failed: {error}");
            }
            engine.end_drain();
        });
    }

    /// One full pass over every due pending operation. Caller holds the
    /// in-progress guard.
    async fn drain(&self) -> Result<()> {
        let started = now_ms();
        let mut ops = self.load_operations().await?;
        ops.retain(|op| op.is_due(started));
        ops.sort_by_key(|op| op.timestamp);
        info!("Sync drain started with {} due operations", ops.len());

        for mut op in ops {
            // Bulkhead: one operation failing its bookkeeping writes must
            // not abort the rest of the pass.
            if let Err(error) = self.process_operation(&mut op).await {
                warn!("Skipping operation {} after store error: {error}", op.id);
            }
        }

        self.write_status_snapshot(now_ms()).await?;
        debug!("Sync drain finished in {}ms", now_ms() - started);
        Ok(())
    }

    async fn process_operation(&self, op: &mut SyncOperation) -> Result<()> {
        match self.apply_operation(op).await {
            Ok(ApplyOutcome::Completed) => {
                op.status = OperationStatus::Completed;
                op.completed_at = Some(now_ms());
                op.last_error = None;
                op.next_retry_at = None;
                self.put_operation(op).await?;
                self.notify_applied(op).await;
            }
            Ok(ApplyOutcome::ManualConflict(message)) => {
                op.status = OperationStatus::Conflict;
                op.last_error = Some(compact_text(&message));
                self.put_operation(op).await?;
                warn!(
                    "Operation {} on {}/{} needs manual resolution: {message}",
                    op.id, op.entity_type, op.entity_id
                );
            }
            Err(error) => {
                backoff::record_failure(op, &error.to_string(), now_ms());
                self.put_operation(op).await?;
                warn!(
                    "Applying operation {} failed (attempt {}/{}): {error}",
                    op.id, op.retry_count, op.max_retries
                );
            }
        }
        Ok(())
    }

    /// Apply one operation against the remote table: a single lookup
    /// followed by an explicit two-armed dispatch per kind.
    async fn apply_operation(&self, op: &SyncOperation) -> Result<ApplyOutcome> {
        let table = op.entity_type.table();
        let existing = self.inner.store.read_one(table, &op.entity_id).await?;
        let now = now_ms();

        match (op.kind, existing) {
            // Deleting something already gone is not an error.
            (OperationKind::Delete, None) => Ok(ApplyOutcome::Completed),
            (OperationKind::Delete, Some(_)) => {
                let mut patch = Row::new();
                patch.insert("deleted".to_string(), Value::Bool(true));
                patch.insert("deleted_at".to_string(), Value::from(now));
                self.inner.store.update(table, &op.entity_id, patch).await?;
                Ok(ApplyOutcome::Completed)
            }
            (OperationKind::Create | OperationKind::Update, None) => {
                // Create inserts; update falls back to an idempotent create.
                let mut row = op.payload.clone();
                row.insert("id".to_string(), Value::String(op.entity_id.clone()));
                row.entry("created_at".to_string()).or_insert(Value::from(now));
                row.insert("synced_at".to_string(), Value::from(now));
                self.inner.store.create(table, row).await?;
                Ok(ApplyOutcome::Completed)
            }
            (OperationKind::Create | OperationKind::Update, Some(remote)) => {
                // Create against an existing row converges to an update.
                self.reconcile(op, &remote, now).await
            }
        }
    }

    /// Compare the payload with the remote row, then either write straight
    /// through, auto-resolve via the configured strategy, or park the
    /// operation for manual review.
    async fn reconcile(
        &self,
        op: &SyncOperation,
        remote: &Row,
        now: i64,
    ) -> Result<ApplyOutcome> {
        let table = op.entity_type.table();
        let conflicts =
            detect_field_conflicts(op.entity_type, &op.entity_id, &op.payload, remote, now);

        if conflicts.is_empty() {
            let mut patch = op.payload.clone();
            patch.insert("synced_at".to_string(), Value::from(now));
            self.inner.store.update(table, &op.entity_id, patch).await?;
            return Ok(ApplyOutcome::Completed);
        }

        let strategy = self.inner.config.strategies.strategy_for(op.entity_type);
        debug!(
            "{} conflicts on {}/{}; applying strategy {strategy}",
            conflicts.len(),
            op.entity_type,
            op.entity_id
        );

        let Some(resolution) = strategy.as_resolution() else {
            for conflict in &conflicts {
                self.put_conflict(conflict).await?;
            }
            return Ok(ApplyOutcome::ManualConflict(format!(
                "strategy '{strategy}' requires explicit resolution"
            )));
        };

        match strategy.resolve(&op.payload, remote, now) {
            Ok(mut resolved) => {
                resolved.insert("synced_at".to_string(), Value::from(now));
                self.inner
                    .store
                    .update(table, &op.entity_id, resolved)
                    .await?;
                for mut conflict in conflicts {
                    conflict.mark_resolved(resolution, "system", now);
                    self.put_conflict(&conflict).await?;
                }
                Ok(ApplyOutcome::Completed)
            }
            Err(error) => {
                // Any strategy failure leaves the dispute for a human.
                for conflict in &conflicts {
                    self.put_conflict(conflict).await?;
                }
                Ok(ApplyOutcome::ManualConflict(error.to_string()))
            }
        }
    }

    async fn notify_applied(&self, op: &SyncOperation) {
        let event = format!("sync.{}", op.kind);
        let payload = json!({
            "entityType": op.entity_type.as_str(),
            "entityId": op.entity_id,
            "kind": op.kind.as_str(),
        });
        self.inner.notifier.trigger_webhook(&event, payload).await;
    }

    // ------------------------------------------------------------------
    // Persistence plumbing
    // ------------------------------------------------------------------

    async fn load_operations(&self) -> Result<Vec<SyncOperation>> {
        self.inner
            .store
            .read(OPERATIONS_TABLE)
            .await?
            .into_iter()
            .map(from_row::<SyncOperation>)
            .collect()
    }

    async fn put_operation(&self, op: &SyncOperation) -> Result<()> {
        let row = to_row(op)?;
        self.inner.store.create(OPERATIONS_TABLE, row).await?;
        Ok(())
    }

    async fn put_conflict(&self, conflict: &SyncConflict) -> Result<()> {
        let row = to_row(conflict)?;
        self.inner.store.create(CONFLICTS_TABLE, row).await?;
        Ok(())
    }

    async fn write_status_snapshot(&self, last_sync: i64) -> Result<()> {
        let ops = self.load_operations().await?;
        let count = |status: OperationStatus| {
            ops.iter().filter(|op| op.status == status).count() as u64
        };

        let snapshot = SyncStatus {
            total_operations: ops.len() as u64,
            pending_operations: count(OperationStatus::Pending),
            failed_operations: count(OperationStatus::Failed),
            conflict_operations: count(OperationStatus::Conflict),
            sync_in_progress: false,
            last_sync: Some(last_sync),
            recorded_at: last_sync,
        };
        self.inner
            .store
            .create(STATUS_TABLE, to_row(&snapshot)?)
            .await?;
        Ok(())
    }
}

fn to_row<T: Serialize>(value: &T) -> Result<Row> {
    match serde_json::to_value(value)? {
        Value::Object(row) => Ok(row),
        other => Err(Error::InvalidInput(format!(
            "record did not serialize to an object: {other}"
        ))),
    }
}

fn from_row<T: DeserializeOwned>(row: Row) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(row))?)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::notify::RecordingNotificationEmitter;
    use crate::store::MemoryRowStore;

    use super::*;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    fn test_engine() -> (SyncEngine, Arc<MemoryRowStore>, Arc<RecordingNotificationEmitter>) {
        let store = Arc::new(MemoryRowStore::new());
        let notifier = Arc::new(RecordingNotificationEmitter::new());
        let config = SyncEngineConfig {
            auto_drain: false,
            ..SyncEngineConfig::default()
        };
        let engine = SyncEngine::new(store.clone(), notifier.clone(), config);
        (engine, store, notifier)
    }

    #[tokio::test]
    async fn queue_persists_a_pending_operation() {
        let (engine, _store, _notifier) = test_engine();
        let id = engine
            .queue_operation(
                OperationKind::Create,
                EntityType::Project,
                "P1",
                row(&[("name", json!("Alpha"))]),
                OperationSource::Local,
            )
            .await
            .unwrap();

        let ops = engine.get_sync_operations(None).await.unwrap();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].id, id);
        assert_eq!(ops[0].status, OperationStatus::Pending);
    }

    #[tokio::test]
    async fn queue_rejects_invalid_payloads() {
        let (engine, _store, _notifier) = test_engine();
        let error = engine
            .queue_operation(
                OperationKind::Create,
                EntityType::Project,
                "P1",
                row(&[("warp_factor", json!(9))]),
                OperationSource::Local,
            )
            .await
            .unwrap_err();
        assert!(matches!(error, Error::InvalidInput(_)));

        assert!(engine.get_sync_operations(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn drain_creates_missing_rows_and_emits_events() {
        let (engine, store, notifier) = test_engine();
        engine
            .queue_operation(
                OperationKind::Create,
                EntityType::Project,
                "P1",
                row(&[("name", json!("Alpha")), ("budget", json!(100))]),
                OperationSource::Local,
            )
            .await
            .unwrap();

        engine.start_sync().await.unwrap();

        let remote = store.read_one("Projects", "P1").await.unwrap().unwrap();
        assert_eq!(remote.get("name"), Some(&json!("Alpha")));
        assert!(remote.get("synced_at").is_some());
        assert!(remote.get("created_at").is_some());

        let ops = engine.get_sync_operations(None).await.unwrap();
        assert_eq!(ops[0].status, OperationStatus::Completed);
        assert!(ops[0].completed_at.is_some());

        let events = notifier.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, "sync.create");
        assert_eq!(
            events[0].1,
            json!({"entityType": "project", "entityId": "P1", "kind": "create"})
        );
    }

    #[tokio::test]
    async fn start_sync_rejects_reentrancy() {
        let (engine, _store, _notifier) = test_engine();

        assert!(engine.try_begin_drain());
        let error = engine.start_sync().await.unwrap_err();
        assert!(matches!(error, Error::AlreadyInProgress));
        engine.end_drain();

        engine.start_sync().await.unwrap();
    }

    #[tokio::test]
    async fn status_snapshot_is_written_after_each_drain() {
        let (engine, _store, _notifier) = test_engine();

        let before = engine.get_sync_status().await.unwrap();
        assert_eq!(before.last_sync, None);
        assert_eq!(before.total_operations, 0);

        engine
            .queue_operation(
                OperationKind::Create,
                EntityType::Client,
                "C1",
                row(&[("name", json!("Acme"))]),
                OperationSource::Local,
            )
            .await
            .unwrap();
        engine.start_sync().await.unwrap();

        let after = engine.get_sync_status().await.unwrap();
        assert_eq!(after.total_operations, 1);
        assert_eq!(after.pending_operations, 0);
        assert!(after.last_sync.is_some());
        assert!(!after.sync_in_progress);
    }

    #[tokio::test]
    async fn clear_sync_history_only_removes_old_terminal_records() {
        let (engine, store, _notifier) = test_engine();

        // One ancient completed, one fresh completed, one failed
        let mut old = SyncOperation::new(
            OperationKind::Create,
            EntityType::Project,
            "P-old",
            Row::new(),
            OperationSource::Local,
        );
        old.status = OperationStatus::Completed;
        old.completed_at = Some(now_ms() - 90 * MS_PER_DAY);
        engine.put_operation(&old).await.unwrap();

        let mut fresh = old.clone();
        fresh.id = OperationId::new();
        fresh.completed_at = Some(now_ms());
        engine.put_operation(&fresh).await.unwrap();

        let mut failed = old.clone();
        failed.id = OperationId::new();
        failed.status = OperationStatus::Failed;
        failed.completed_at = None;
        failed.failed_at = Some(now_ms() - 90 * MS_PER_DAY);
        engine.put_operation(&failed).await.unwrap();

        let mut old_conflict = SyncConflict::new(
            EntityType::Project,
            "P-old",
            "budget",
            json!(1),
            json!(2),
            1_000,
        );
        old_conflict.mark_resolved(
            ConflictResolution::Merge,
            "system",
            now_ms() - 90 * MS_PER_DAY,
        );
        engine.put_conflict(&old_conflict).await.unwrap();

        let open_conflict = SyncConflict::new(
            EntityType::Project,
            "P-old",
            "name",
            json!("a"),
            json!("b"),
            now_ms(),
        );
        engine.put_conflict(&open_conflict).await.unwrap();

        let removed = engine.clear_sync_history(Some(30)).await.unwrap();
        assert_eq!(removed, 2);

        let ops = engine.get_sync_operations(None).await.unwrap();
        assert_eq!(ops.len(), 2);
        assert!(ops.iter().all(|op| op.id != old.id));

        assert_eq!(store.len(CONFLICTS_TABLE).await, 1);
        let remaining = engine.get_conflicts(None).await.unwrap();
        assert_eq!(remaining[0].id, open_conflict.id);
    }

    #[tokio::test]
    async fn clear_sync_history_rejects_negative_windows() {
        let (engine, _store, _notifier) = test_engine();
        let error = engine.clear_sync_history(Some(-1)).await.unwrap_err();
        assert!(matches!(error, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn clear_sync_history_compacts_stale_status_snapshots() {
        let (engine, store, _notifier) = test_engine();

        engine
            .write_status_snapshot(now_ms() - 90 * MS_PER_DAY)
            .await
            .unwrap();
        engine
            .write_status_snapshot(now_ms() - 60 * MS_PER_DAY)
            .await
            .unwrap();

        // Both snapshots predate the cutoff; the newest must survive.
        let removed = engine.clear_sync_history(Some(30)).await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.len(STATUS_TABLE).await, 1);

        let status = engine.get_sync_status().await.unwrap();
        assert_eq!(status.last_sync, Some(status.recorded_at));
    }

    #[tokio::test]
    async fn operations_round_trip_through_rows() {
        let op = SyncOperation::new(
            OperationKind::Update,
            EntityType::Invoice,
            "I1",
            row(&[("amount", json!(12.5))]),
            OperationSource::Remote,
        );
        let restored: SyncOperation = from_row(to_row(&op).unwrap()).unwrap();
        assert_eq!(restored, op);
    }
}
