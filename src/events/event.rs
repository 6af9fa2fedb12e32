//! # Lifecycle events emitted by the controller and the facade.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Poll events**: one per observed status (`Enqueued`, `Progress`, `Success`, `Error`)
//!   plus `TimedOut` when the polling budget runs out
//! - **Management events**: `Submitted` once a request has been accepted by the platform,
//!   `Finished` when a facade call ends without a terminal poll event
//! - **Subscriber events**: subscriber health (`SubscriberPanicked`, `SubscriberOverflow`)
//!
//! Poll events are namespaced by [`OperationKind`]; [`Event::name`] renders the full name,
//! e.g. `package-version/create-enqueued`.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Events of one operation are published from one task, so their `seq` order is the
//! status-transition order.
//!
//! ## Example
//! ```rust
//! use pkgvisor::{Event, EventKind, OperationKind, RemoteStatus};
//!
//! let ev = Event::new(EventKind::Progress)
//!     .with_operation(OperationKind::Create, "08c000000000001AAA")
//!     .with_status(RemoteStatus::VerifyingMetadata)
//!     .with_remaining_ms(540_000);
//!
//! assert_eq!(ev.name(), "package-version/create-progress");
//! assert_eq!(ev.remaining_ms, Some(540_000));
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::status::{RemoteStatus, StatusRecord};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Event namespace prefix.
const NAMESPACE: &str = "package-version";

/// Family of asynchronous remote operation an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Building a new package version.
    Create,
    /// Waiting for a subscriber version to become installable.
    Publish,
    /// Installing a subscriber version.
    Install,
    /// Uninstalling a subscriber version.
    Uninstall,
}

impl OperationKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            OperationKind::Create => "create",
            OperationKind::Publish => "publish",
            OperationKind::Install => "install",
            OperationKind::Uninstall => "uninstall",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Management events ===
    /// Request accepted by the platform.
    ///
    /// Sets:
    /// - `operation`, `operation_id`: the new remote operation
    Submitted,

    /// Facade call returned without a terminal poll event (single fetch, fetch failure,
    /// unrecognized status).
    ///
    /// Sets:
    /// - `operation`, `operation_id`
    /// - `status`: the fetched status, on a single fetch
    /// - `reason`: error label, when the call failed
    Finished,

    // === Poll events ===
    /// Poll observed `Queued`.
    ///
    /// Sets:
    /// - `operation`, `operation_id`, `status`, `remaining_ms`, record
    Enqueued,

    /// Poll observed a non-terminal, non-queued status.
    ///
    /// Sets:
    /// - `operation`, `operation_id`, `status`, `remaining_ms`, record
    Progress,

    /// Poll observed `Success` (terminal).
    ///
    /// Sets:
    /// - `operation`, `operation_id`, `status`, `remaining_ms`, record
    Success,

    /// Poll observed `Error` (terminal).
    ///
    /// Sets:
    /// - `operation`, `operation_id`, `status`, `remaining_ms`, record
    /// - `reason`: remote error messages joined
    Error,

    /// Polling budget exhausted without a terminal status.
    ///
    /// Sets:
    /// - `operation`, `operation_id`, `remaining_ms`
    /// - `status` and record: last observed, if any poll completed
    TimedOut,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `source`: subscriber name
    /// - `reason`: panic message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `source`: subscriber name
    /// - `reason`: "full" or "closed"
    SubscriberOverflow,
}

impl EventKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            EventKind::Submitted => "submitted",
            EventKind::Finished => "finished",
            EventKind::Enqueued => "enqueued",
            EventKind::Progress => "progress",
            EventKind::Success => "success",
            EventKind::Error => "error",
            EventKind::TimedOut => "timed-out",
            EventKind::SubscriberPanicked => "subscriber-panicked",
            EventKind::SubscriberOverflow => "subscriber-overflow",
        }
    }

    /// True for events that end an operation.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            EventKind::Success | EventKind::Error | EventKind::TimedOut | EventKind::Finished
        )
    }
}

/// Lifecycle event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Operation family (namespace).
    pub operation: Option<OperationKind>,
    /// Remote operation id.
    pub operation_id: Option<Arc<str>>,
    /// Observed remote status.
    pub status: Option<RemoteStatus>,
    /// Remaining polling budget in milliseconds; may be negative near the end of a window.
    pub remaining_ms: Option<i64>,
    /// Human-readable reason (remote errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Name of the subscriber, for subscriber events.
    pub source: Option<Arc<str>>,

    /// The full status record, type-erased; read with [`Event::record`].
    record: Option<Arc<dyn Any + Send + Sync>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            operation: None,
            operation_id: None,
            status: None,
            remaining_ms: None,
            reason: None,
            source: None,
            record: None,
        }
    }

    /// Creates a poll event describing `record`.
    pub fn from_record<P>(
        kind: EventKind,
        operation: OperationKind,
        record: &StatusRecord<P>,
        remaining_ms: i64,
    ) -> Self
    where
        P: Clone + Send + Sync + 'static,
    {
        let mut ev = Event::new(kind)
            .with_operation(operation, record.operation_id.as_str())
            .with_status(record.status.clone())
            .with_remaining_ms(remaining_ms)
            .with_record(record.clone());
        if let Some(summary) = record.error_summary() {
            ev = ev.with_reason(summary);
        }
        ev
    }

    /// Full event name, namespaced by operation kind.
    pub fn name(&self) -> String {
        match self.operation {
            Some(op) => format!("{NAMESPACE}/{}-{}", op.as_str(), self.kind.as_str()),
            None => format!("{NAMESPACE}/{}", self.kind.as_str()),
        }
    }

    /// Returns the status record if it carries payload type `P`.
    pub fn record<P: 'static>(&self) -> Option<&StatusRecord<P>> {
        self.record.as_deref()?.downcast_ref::<StatusRecord<P>>()
    }

    /// Attaches the operation family and remote id.
    #[inline]
    pub fn with_operation(mut self, operation: OperationKind, id: impl Into<Arc<str>>) -> Self {
        self.operation = Some(operation);
        self.operation_id = Some(id.into());
        self
    }

    /// Attaches an observed remote status.
    #[inline]
    pub fn with_status(mut self, status: RemoteStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Attaches the remaining polling budget.
    #[inline]
    pub fn with_remaining_ms(mut self, ms: i64) -> Self {
        self.remaining_ms = Some(ms);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a full status record.
    #[inline]
    pub fn with_record<P>(mut self, record: StatusRecord<P>) -> Self
    where
        P: Send + Sync + 'static,
    {
        self.record = Some(Arc::new(record));
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        let mut ev = Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"));
        ev.source = Some(Arc::from(subscriber));
        ev
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        let mut ev = Event::new(EventKind::SubscriberPanicked).with_reason(info);
        ev.source = Some(Arc::from(subscriber));
        ev
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("seq", &self.seq)
            .field("name", &self.name())
            .field("operation_id", &self.operation_id)
            .field("status", &self.status)
            .field("remaining_ms", &self.remaining_ms)
            .field("reason", &self.reason)
            .finish_non_exhaustive()
    }
}
