//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for plugging custom event handlers into the
//! runtime. Each subscriber is driven by a dedicated worker loop fed by a bounded
//! queue owned by the [`SubscriberSet`](crate::SubscriberSet).
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use pkgvisor::{Event, EventKind, OperationKind, Subscribe};
//!
//! /// Prints progress for one watched create request only.
//! struct Watch {
//!     operation_id: String,
//! }
//!
//! #[async_trait]
//! impl Subscribe for Watch {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.operation == Some(OperationKind::Create)
//!             && ev.operation_id.as_deref() == Some(self.operation_id.as_str())
//!         {
//!             println!("{} ({:?}ms left)", ev.name(), ev.remaining_ms);
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "watch" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Event subscriber for lifecycle observability.
///
/// Each subscriber runs in isolation:
/// - **Bounded queue** buffers events (capacity via [`Self::queue_capacity`]).
/// - **Dedicated worker task** processes events sequentially (FIFO).
/// - **Panic isolation**: panics are caught and published as `SubscriberPanicked`.
///
/// Subscribers receive events for every operation; filtering by
/// [`Event::operation_id`] is the subscriber's job.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Called from a dedicated worker task, not in the publisher context.
    async fn on_event(&self, event: &Event);

    /// Returns the subscriber name used in logs and overflow/panic events.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns the preferred queue capacity for this subscriber.
    ///
    /// On overflow the new event is dropped for this subscriber only and an
    /// `EventKind::SubscriberOverflow` is published. Clamped to a minimum of 1.
    ///
    /// Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
