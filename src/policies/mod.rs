//! Polling policies.
//!
//! This module groups the knobs that control **how often** and **how long** the
//! controller polls a remote operation.
//!
//! ## Contents
//! - [`PollingPolicy`] fixed frequency + overall timeout (zero timeout = single fetch)
//!
//! ## Quick wiring
//! ```text
//! Config { create_polling, install_polling, publish_polling, uninstall_polling }
//!      └─► PackageVersions picks the policy per operation (callers may override)
//!           └─► Controller::run(kind, id, source, policy)
//! ```

mod polling;

pub use polling::PollingPolicy;
