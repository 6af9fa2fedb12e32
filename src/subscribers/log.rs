//! # LogWriter: lifecycle event logger
//!
//! A subscriber that writes every [`Event`] as a structured `tracing` record.
//! Use it for demos, CLIs, or as a reference for custom subscribers.
//!
//! ## Example output (fmt layer)
//! ```text
//! INFO pkgvisor: [submitted] op=create id=08c...
//! INFO pkgvisor: [enqueued] op=create id=08c... status=Queued remaining_ms=600000
//! INFO pkgvisor: [progress] op=create id=08c... status=VerifyingMetadata remaining_ms=570000
//! INFO pkgvisor: [success] op=create id=08c... status=Success remaining_ms=540000
//! WARN pkgvisor: [timed-out] op=install id=0Hf... status=InProgress remaining_ms=-1200
//! ```

use async_trait::async_trait;
use tracing::{info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let op = e.operation.map(|o| o.as_str()).unwrap_or("-");
        let id = e.operation_id.as_deref().unwrap_or("-");
        let status = e.status.as_ref().map(|s| s.as_str()).unwrap_or("-");

        match e.kind {
            EventKind::Submitted => {
                info!(op, id, "[submitted]");
            }
            EventKind::Enqueued | EventKind::Progress | EventKind::Success => {
                info!(op, id, status, remaining_ms = ?e.remaining_ms, "[{}]", e.kind.as_str());
            }
            EventKind::Finished => {
                info!(op, id, status, reason = e.reason.as_deref().unwrap_or("-"), "[finished]");
            }
            EventKind::Error => {
                warn!(op, id, status, errors = ?e.reason, "[error]");
            }
            EventKind::TimedOut => {
                warn!(op, id, status, remaining_ms = ?e.remaining_ms, "[timed-out]");
            }
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked => {
                warn!(
                    subscriber = e.source.as_deref().unwrap_or("unknown"),
                    reason = e.reason.as_deref().unwrap_or("unknown"),
                    "[{}]",
                    e.kind.as_str()
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
