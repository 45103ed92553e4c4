//! Core synchronization engine for business records.
//!
//! Local mutations are queued as [`models::SyncOperation`]s and drained by the
//! [`sync::SyncEngine`] against a generic [`store::RowStore`]. Concurrent
//! edits surface as field-level [`models::SyncConflict`]s, settled either
//! automatically by a configured [`sync::StrategyKind`] or manually through
//! [`sync::SyncEngine::resolve_conflict`].

pub mod error;
pub mod models;
pub mod notify;
pub mod store;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use models::{
    ConflictId, ConflictResolution, EntityType, OperationId, OperationKind, OperationSource,
    OperationStatus, SyncConflict, SyncOperation, SyncStatus,
};
pub use notify::{HttpNotificationEmitter, NotificationEmitter, NullNotificationEmitter};
pub use store::{MemoryRowStore, Row, RowStore, SqliteRowStore};
pub use sync::{StrategyKind, StrategyRegistry, SyncEngine, SyncEngineConfig};
