//! # Event subscribers for the lifecycle runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out, and built-in
//! implementations for handling events broadcast through the [`Bus`](crate::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Controller ── publish(Event) ──► Bus ──► notifier listener ──► SubscriberSet
//!                                                                      │
//!                                                   ┌──────────────────┼──────────┐
//!                                                   ▼                  ▼          ▼
//!                                               LogWriter      InFlightTracker  Custom
//! ```
//!
//! ## Subscriber types
//! - **Passive subscribers** observe and react to events (logging, progress rendering)
//! - **Stateful subscribers** maintain state from events ([`InFlightTracker`])

mod inflight;
#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

pub use inflight::{InFlight, InFlightTracker};
#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
