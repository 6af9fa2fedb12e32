//! # pkgvisor
//!
//! **Pkgvisor** manages the lifecycle of versioned packages on a remote packaging platform:
//! creating versions, waiting for the platform to finish building them, installing,
//! uninstalling, updating metadata, promoting, and reporting.
//!
//! Most of those operations are asynchronous on the remote side. The crate drives them with one
//! generic poll loop, the [`Controller`], which publishes a lifecycle [`Event`] for every status
//! it observes.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   caller
//!     │ create / install / uninstall / update / promote / report / ...
//!     ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  PackageVersions (facade)                                         │
//! │  - Platform (remote service, trait object)                        │
//! │  - Project  (alias table, trait object)                           │
//! │  - Controller (poll loop, one per facade, stateless per call)     │
//! │  - Notifier (bus ─► subscriber set)                               │
//! └──────┬───────────────────────────────┬────────────────────────────┘
//!        │ immediate mutation            │ submit ─► operation id
//!        ▼                               ▼
//!   Platform::update_version      Controller::run(kind, id, StatusSource, policy)
//!                                        │ publishes:
//!                                        │ - Enqueued / Progress (per pending poll)
//!                                        │ - Success / Error     (terminal)
//!                                        │ - TimedOut            (budget exhausted)
//!                                        ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                   Bus (broadcast channel)                         │
//! │                (capacity: Config::bus_capacity)                   │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                             notifier listener
//!                                   ▼
//!                             SubscriberSet (per-sub queues)
//!                        ┌──────────┼──────────┐
//!                        ▼          ▼          ▼
//!                    LogWriter  InFlightTracker  custom
//! ```
//!
//! ### Poll loop
//! ```text
//! timeout == 0 ─► fetch once, return (no events)
//!
//! within timeout {
//!   ├─► record = source.fetch(id)?
//!   ├─► Queued            ─► Enqueued
//!   ├─► InProgress/...    ─► Progress
//!   ├─► Success           ─► Success, return Ok(record)
//!   ├─► Error             ─► Error,   return Ok(record)
//!   ├─► unrecognized      ─► Err(UnrecognizedStatus)
//!   ├─► remaining_ms -= frequency
//!   └─► sleep(frequency)
//! }
//! elapsed ─► TimedOut, Err(Timeout)
//! ```
//!
//! ## Features
//! | Area              | Description                                                        | Key types / traits                          |
//! |-------------------|--------------------------------------------------------------------|---------------------------------------------|
//! | **Lifecycle**     | Package version operations and the lazily loaded version entity.  | [`PackageVersions`], [`PackageVersion`]     |
//! | **Polling**       | Generic long-running-operation controller.                        | [`Controller`], [`StatusSource`], [`FetchFn`] |
//! | **Subscriber API**| Hook into lifecycle events (logging, progress, custom subscribers).| [`Subscribe`], [`InFlightTracker`]          |
//! | **Seams**         | Remote platform and project metadata.                             | [`Platform`], [`Project`]                   |
//! | **Errors**        | Typed errors with stable labels.                                  | [`PackageError`], [`RemoteError`]           |
//! | **Configuration** | Polling defaults and runtime settings.                            | [`Config`], [`PollingPolicy`]               |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use pkgvisor::{Config, CreateOptions, MemoryProject, PackageId, PackageVersions, Platform, PollingPolicy};
//!
//! # fn connect() -> Arc<dyn Platform> { unimplemented!() }
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let platform: Arc<dyn Platform> = connect();
//!
//!     // Build subscribers (optional)
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn pkgvisor::Subscribe>> = vec![Arc::new(pkgvisor::LogWriter::new())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn pkgvisor::Subscribe>> = Vec::new();
//!
//!     let versions = PackageVersions::builder(platform, Arc::new(MemoryProject::new()), Config::default())
//!         .with_subscribers(subs)
//!         .build();
//!
//!     let options = CreateOptions::new(PackageId::parse("0Ho000000000001AAA")?);
//!     let polling = PollingPolicy::new(Duration::from_secs(30), Duration::from_secs(600));
//!     let created = versions.create(&options, Some(polling)).await?;
//!     println!("{} -> {}", created.operation_id, created.status);
//!
//!     versions.shutdown().await;
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod ids;
mod lifecycle;
mod platform;
mod policies;
mod project;
mod status;
mod subscribers;

// ---- Public re-exports ----

pub use config::Config;
pub use core::{Controller, FetchFn, StatusSource};
pub use error::{PackageError, RemoteError, Result, SUPPORT_HINT};
pub use events::{Bus, Event, EventKind, OperationKind};
pub use ids::{
    CreateRequestId, IdKind, InstallRequestId, PackageId, PackageVersionId, SubscriberVersionId,
    UninstallRequestId, VersionKey,
};
pub use lifecycle::{InstallOptions, PackageVersion, PackageVersions, PackageVersionsBuilder, VersionCache};
pub use platform::{
    CompileScope, CreateOptions, CreateRequestRecord, CreateResult, ExternalSites,
    InstallRequest, InstallRequestRecord, Platform, PublishCheck, RemoteResult, SaveResult,
    SecurityType, UninstallRequestRecord, UpgradeType, VersionChanges, VersionRecord,
    VersionReport, VersionUpdate,
};
pub use policies::PollingPolicy;
pub use project::{MemoryProject, NoProject, Project};
pub use status::{Phase, RemoteStatus, StatusRecord};
pub use subscribers::{InFlight, InFlightTracker, Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
