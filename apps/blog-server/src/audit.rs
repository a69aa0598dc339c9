//! Audit log - one entry per completed mutation.

use std::fmt::Display;

/// Record a completed mutation as a single informational entry on the
/// process-wide sink.
///
/// The write is direct and synchronous; the sink never reports failures
/// back to the caller. Ordering across concurrent requests follows the
/// sink's own serialization.
pub fn record(actor: &str, action: &str, subject: impl Display) {
    tracing::info!(target: "audit", actor, action, subject = %subject);
}
