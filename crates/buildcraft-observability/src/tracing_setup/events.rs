//! Structured log events for cost write operations.
//!
//! Each function emits a `tracing` event with structured fields.

use buildcraft_core::models::CostKey;

/// Log an optimistic update request.
pub fn update_requested(key: &CostKey, value: f64, items: usize) {
    tracing::debug!(
        event = "update_requested",
        key = %key,
        value = value,
        items = items,
        "cost update requested"
    );
}

/// Log queued writes discarded in favour of a newer one.
pub fn write_superseded(key: &CostKey, discarded: usize) {
    tracing::debug!(
        event = "write_superseded",
        key = %key,
        discarded = discarded,
        "older queued writes superseded"
    );
}

/// Log cancellation of an in-flight or queued write.
pub fn write_cancelled(key: &CostKey, reason: &str) {
    tracing::debug!(
        event = "write_cancelled",
        key = %key,
        reason = %reason,
        "cost write cancelled"
    );
}

/// Log a batch that settled successfully.
pub fn write_flushed(key: &CostKey, items: usize, elapsed_ms: u128) {
    tracing::info!(
        event = "write_flushed",
        key = %key,
        items = items,
        elapsed_ms = elapsed_ms as u64,
        "cost write applied"
    );
}

/// Log a batch that failed for a genuine reason.
pub fn write_failed(key: &CostKey, error: &dyn std::fmt::Display) {
    tracing::warn!(
        event = "write_failed",
        key = %key,
        error = %error,
        "cost write failed"
    );
}

/// Log an optimistic value rolled back to the confirmed one.
pub fn rollback_applied(key: &CostKey, attempted: f64, restored: f64) {
    tracing::warn!(
        event = "rollback_applied",
        key = %key,
        attempted = attempted,
        restored = restored,
        "optimistic value rolled back"
    );
}

/// Log a server value disagreeing with a pending local edit.
pub fn conflict_detected(key: &CostKey, local: f64, server: f64) {
    tracing::warn!(
        event = "conflict_detected",
        key = %key,
        local = local,
        server = server,
        "cost conflict detected"
    );
}

/// Log a human conflict decision.
pub fn conflict_resolved(key: &CostKey, kept_local: bool, value: f64) {
    tracing::info!(
        event = "conflict_resolved",
        key = %key,
        kept_local = kept_local,
        value = value,
        "cost conflict resolved"
    );
}
