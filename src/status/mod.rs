//! Remote status model.
//!
//! - [`RemoteStatus`] the normalized status enumeration reported by the platform
//! - [`Phase`] classification of a status (pending / succeeded / failed)
//! - [`StatusRecord`] one poll result: status, operation id, errors and a domain payload
//!
//! ## Transition table
//! ```text
//! Queued                                   → Pending   → EventKind::Enqueued
//! InProgress | Initializing | Verifying*   → Pending   → EventKind::Progress
//! FinalizingPackageVersion
//! Success                                  → Succeeded → EventKind::Success
//! Error                                    → Failed    → EventKind::Error
//! Unrecognized(_)                          → (none)    → controller fails fast
//! ```

mod record;
mod remote;

pub use record::StatusRecord;
pub use remote::{Phase, RemoteStatus};
