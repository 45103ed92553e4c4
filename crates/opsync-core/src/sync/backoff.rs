//! Retry bookkeeping with exponential backoff.

use crate::models::{OperationStatus, SyncOperation};
use crate::util::compact_text;

/// Seconds to wait before attempt number `retry_count + 1`.
///
/// `2^retry_count`, capped to keep the shift well-defined.
pub fn backoff_delay_secs(retry_count: u32) -> i64 {
    1_i64 << retry_count.min(30)
}

/// Record a failed attempt on an operation.
///
/// While budget remains the operation stays `pending` with a future
/// `next_retry_at`; once the budget is spent it is parked as `failed` until
/// an explicit reset.
pub fn record_failure(op: &mut SyncOperation, message: &str, now_ms: i64) {
    op.retry_count += 1;
    op.last_error = Some(compact_text(message));

    if op.retry_count < op.max_retries {
        op.status = OperationStatus::Pending;
        op.next_retry_at = Some(now_ms + backoff_delay_secs(op.retry_count) * 1_000);
    } else {
        op.status = OperationStatus::Failed;
        op.failed_at = Some(now_ms);
        op.next_retry_at = None;
    }
}
