//! Runtime core: polling and notification plumbing.
//!
//! This module contains the generic machinery every asynchronous package operation runs on.
//! The public API from this module is [`Controller`] plus the [`StatusSource`] seam.
//!
//! Internal modules:
//! - [`poller`]: the one-fetch abstraction and its closure-backed implementation;
//! - [`controller`]: the poll loop with its transition table, events and timeout;
//! - [`notifier`]: forwards bus events to the subscriber workers.

pub(crate) mod controller;
pub(crate) mod notifier;
pub(crate) mod poller;

pub use controller::Controller;
pub use poller::{FetchFn, StatusSource};
