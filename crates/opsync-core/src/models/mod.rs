//! Data models for the sync engine

mod conflict;
mod entity;
mod operation;
mod status;

pub use conflict::{ConflictId, ConflictResolution, SyncConflict};
pub use entity::{EntityType, FieldKind, FieldSpec, BOOKKEEPING_FIELDS};
pub use operation::{
    OperationId, OperationKind, OperationSource, OperationStatus, SyncOperation,
    DEFAULT_MAX_RETRIES,
};
pub use status::SyncStatus;
