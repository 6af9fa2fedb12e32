//! # Global runtime configuration.
//!
//! Provides [`Config`], the centralized settings for a [`PackageVersions`](crate::PackageVersions)
//! facade.
//!
//! Config is used in two ways:
//! 1. **Facade creation**: `PackageVersions::builder(platform, project, config)`
//! 2. **Per-operation defaults**: polling policies used when a call passes `None`
//!
//! ## Sentinel values
//! - `*_polling.timeout = 0s` → single fetch, no poll loop
//! - `bus_capacity = 0` → clamped to 1

use std::time::Duration;

use crate::policies::PollingPolicy;

/// Global configuration for the package lifecycle runtime.
///
/// ## Field semantics
/// - `bus_capacity`: Event bus ring buffer size (min 1; clamped by Bus)
/// - `auto_update_project`: record newly created versions in project metadata
/// - `create_polling`: default policy for waiting on version creation
/// - `publish_polling`: default policy for waiting until a version is installable
/// - `install_polling`: default policy for waiting on an install request
/// - `uninstall_polling`: default policy for waiting on an uninstall request
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` messages
    /// skip older items. Minimum value is 1 (enforced by Bus).
    pub bus_capacity: usize,

    /// Whether a successful create writes an alias for the new version into project metadata.
    ///
    /// Disable in automation contexts where the project files must not change.
    pub auto_update_project: bool,

    /// Default policy for `create` / `wait_for_create_version`.
    pub create_polling: PollingPolicy,

    /// Default policy for the publish wait before an install.
    pub publish_polling: PollingPolicy,

    /// Default policy for waiting on an install request.
    pub install_polling: PollingPolicy,

    /// Default policy for waiting on an uninstall request.
    pub uninstall_polling: PollingPolicy,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024`
    /// - `auto_update_project = true`
    /// - `create_polling`: every 30s, single fetch
    /// - `publish_polling`: every 5s, single fetch
    /// - `install_polling`: every 10s, single fetch
    /// - `uninstall_polling`: every 5s, single fetch
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            auto_update_project: true,
            create_polling: PollingPolicy::new(Duration::from_secs(30), Duration::ZERO),
            publish_polling: PollingPolicy::new(Duration::from_secs(5), Duration::ZERO),
            install_polling: PollingPolicy::new(Duration::from_secs(10), Duration::ZERO),
            uninstall_polling: PollingPolicy::new(Duration::from_secs(5), Duration::ZERO),
        }
    }
}
