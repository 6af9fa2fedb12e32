//! # InFlightTracker: operations that have not reached a terminal status yet
//!
//! Maintains an in-memory map of remote operations that were submitted or observed pending,
//! keyed by operation id.
//!
//! ## Behavior
//! - `Submitted`, `Enqueued`, `Progress` → insert/update (latest status kept)
//! - `Success`, `Error`, `TimedOut`, `Finished` → remove
//! - terminal event for an unknown id → tolerated, logged at debug
//!
//! ## Internal scheme
//! ```text
//! on_event(ev):
//!   ├─ pending kind  && ev.operation_id => map[id] = (operation, status)
//!   ├─ terminal kind && ev.operation_id => map.remove(id)
//!   └─ otherwise: ignore
//!
//! snapshot() -> Vec<InFlight>  (sorted by operation id)
//! ```

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use tracing::debug;

use crate::events::{Event, EventKind, OperationKind};
use crate::status::RemoteStatus;
use crate::subscribers::Subscribe;

/// One operation the tracker considers in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InFlight {
    pub operation_id: String,
    pub operation: OperationKind,
    /// Last observed status; `None` until the first poll.
    pub status: Option<RemoteStatus>,
}

/// Tracks remote operations that are still running.
pub struct InFlightTracker {
    inner: RwLock<HashMap<String, InFlight>>,
    capacity: usize,
}

impl InFlightTracker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            capacity: 2048,
        }
    }

    /// Configure the queue capacity for this subscriber.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Returns a snapshot of in-flight operations, sorted by operation id.
    #[must_use]
    pub fn snapshot(&self) -> Vec<InFlight> {
        let g = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let mut v: Vec<InFlight> = g.values().cloned().collect();
        v.sort_unstable_by(|a, b| a.operation_id.cmp(&b.operation_id));
        v
    }

    /// True if `operation_id` is currently in flight.
    #[must_use]
    pub fn contains(&self, operation_id: &str) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(operation_id)
    }
}

#[async_trait]
impl Subscribe for InFlightTracker {
    async fn on_event(&self, ev: &Event) {
        let (Some(operation), Some(id)) = (ev.operation, ev.operation_id.as_deref()) else {
            return;
        };

        match ev.kind {
            EventKind::Submitted | EventKind::Enqueued | EventKind::Progress => {
                let mut g = self.inner.write().unwrap_or_else(PoisonError::into_inner);
                let entry = g.entry(id.to_owned()).or_insert_with(|| InFlight {
                    operation_id: id.to_owned(),
                    operation,
                    status: None,
                });
                if ev.status.is_some() {
                    entry.status = ev.status.clone();
                }
            }
            EventKind::Success | EventKind::Error | EventKind::TimedOut | EventKind::Finished => {
                let mut g = self.inner.write().unwrap_or_else(PoisonError::into_inner);
                if g.remove(id).is_none() {
                    debug!(operation_id = id, "terminal event for untracked operation");
                }
            }
            _ => {}
        }
    }

    fn name(&self) -> &'static str {
        "InFlightTracker"
    }

    fn queue_capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InFlightTracker {
    fn default() -> Self {
        Self::new()
    }
}
