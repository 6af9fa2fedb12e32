//! Lifecycle events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to lifecycle events emitted by the poll controller and the facade.
//!
//! ## Contents
//! - [`EventKind`], [`OperationKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Controller::run`, `PackageVersions` (submissions),
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the notifier listener spawned by `PackageVersionsBuilder::build`
//!   (fans out to `SubscriberSet`), and any receiver from [`Bus::subscribe`].

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind, OperationKind};
