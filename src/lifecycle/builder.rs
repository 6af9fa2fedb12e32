use std::sync::Arc;

use crate::{
    config::Config,
    core::{Controller, notifier::Notifier},
    events::Bus,
    platform::Platform,
    project::Project,
    subscribers::Subscribe,
};

use super::facade::PackageVersions;

/// Builder for constructing a [`PackageVersions`] facade.
pub struct PackageVersionsBuilder {
    platform: Arc<dyn Platform>,
    project: Arc<dyn Project>,
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl PackageVersionsBuilder {
    pub(crate) fn new(platform: Arc<dyn Platform>, project: Arc<dyn Project>, cfg: Config) -> Self {
        Self {
            platform,
            project,
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers.
    ///
    /// Subscribers receive every lifecycle event (submissions, poll transitions, timeouts)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the facade.
    ///
    /// Initializes the event bus, the controller and, when subscribers were given, the
    /// notifier task. Must be called inside a tokio runtime if there are subscribers.
    pub fn build(self) -> PackageVersions {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let notifier = Notifier::start(&bus, self.subscribers);
        let controller = Controller::new(bus);

        PackageVersions::new_internal(self.platform, self.project, self.cfg, controller, notifier)
    }
}
