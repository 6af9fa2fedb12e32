//! # PackageVersions: package lifecycle operations.
//!
//! The facade is the composition root: it owns the [`Platform`], the [`Project`], the
//! [`Controller`] and the notifier, and exposes every package version operation.
//!
//! ## Operation kinds
//! ```text
//! immediate (one platform call):
//!   update / promote / delete / undelete / report / external_sites / *_status(once)
//!
//! asynchronous (submit, then controller poll loop):
//!   create     ─► submit_create    ─► Submitted ─► Controller(Create)    ─► project alias
//!   install    ─► publish wait (Controller(Publish)) ─► submit_install
//!                                   ─► Submitted ─► Controller(Install)
//!   uninstall  ─► submit_uninstall ─► Submitted ─► Controller(Uninstall)
//! ```
//!
//! ## Rules
//! - Every id is validated before the first platform call ([`PackageError::InvalidId`]).
//! - Id-or-alias arguments are resolved through [`Project::resolve_alias`] first.
//! - A remote `Error` status is returned as `Ok(record)`; `uninstall_report` is the exception.
//! - Calls that take `Option<PollingPolicy>` fall back to the [`Config`] defaults.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    config::Config,
    core::{Controller, StatusSource, notifier::Notifier},
    error::{PackageError, Result},
    events::{Bus, Event, EventKind, OperationKind},
    ids::{CreateRequestId, InstallRequestId, PackageVersionId, SubscriberVersionId,
        UninstallRequestId, VersionKey},
    platform::{
        CreateOptions, CreateResult, InstallRequest, InstallRequestRecord, Platform,
        UninstallRequestRecord, VersionChanges, VersionReport,
    },
    policies::PollingPolicy,
    project::Project,
    status::StatusRecord,
};

use super::builder::PackageVersionsBuilder;
use super::sources::{
    CreateSource, InstallSource, PublishSource, UninstallSource, create_record, uninstall_record,
};
use super::version::PackageVersion;

/// Polling policies of the two waits in [`PackageVersions::install`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallOptions {
    /// Wait for the version to become installable; timeout 0 checks once.
    pub publish_polling: PollingPolicy,
    /// Wait for the install request; timeout 0 fetches once.
    pub polling: PollingPolicy,
}

impl InstallOptions {
    /// Publish and install policies taken from `cfg`.
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            publish_polling: cfg.publish_polling,
            polling: cfg.install_polling,
        }
    }
}

/// Package version lifecycle facade.
pub struct PackageVersions {
    platform: Arc<dyn Platform>,
    project: Arc<dyn Project>,
    cfg: Config,
    controller: Controller,
    notifier: Notifier,
}

impl PackageVersions {
    /// Returns a builder wiring `platform` and `project` with `cfg`.
    pub fn builder(
        platform: Arc<dyn Platform>,
        project: Arc<dyn Project>,
        cfg: Config,
    ) -> PackageVersionsBuilder {
        PackageVersionsBuilder::new(platform, project, cfg)
    }

    pub(crate) fn new_internal(
        platform: Arc<dyn Platform>,
        project: Arc<dyn Project>,
        cfg: Config,
        controller: Controller,
        notifier: Notifier,
    ) -> Self {
        Self {
            platform,
            project,
            cfg,
            controller,
            notifier,
        }
    }

    /// Bus every lifecycle event is published on.
    pub fn bus(&self) -> &Bus {
        self.controller.bus()
    }

    /// Configuration this facade was built with.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Number of attached subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.notifier.subscriber_count()
    }

    /// Install polling defaults from the configuration.
    pub fn install_options(&self) -> InstallOptions {
        InstallOptions::from_config(&self.cfg)
    }

    /// Delivers pending events to subscribers and stops their workers.
    pub async fn shutdown(self) {
        self.notifier.shutdown().await;
    }

    /// Entity for a package version id, subscriber version id, or project alias.
    ///
    /// Nothing is fetched until a record field is needed.
    pub fn version(&self, id_or_alias: &str) -> Result<PackageVersion> {
        let key = VersionKey::parse(self.resolve(id_or_alias))?;
        Ok(PackageVersion::new(Arc::clone(&self.platform), key))
    }

    // ---- create ----

    /// Submits a version create request and waits for it per `polling`.
    pub async fn create(
        &self,
        options: &CreateOptions,
        polling: Option<PollingPolicy>,
    ) -> Result<StatusRecord<CreateResult>> {
        let request = self.platform.submit_create(options).await?;
        let id = CreateRequestId::parse(&request.id)?;
        info!(request_id = %id, package_id = %options.package_id, "version create submitted");
        self.submitted(OperationKind::Create, id.as_str());

        self.wait_for_create_version(id.as_str(), polling).await
    }

    /// Current state of a create request (single fetch, no events).
    pub async fn create_status(&self, request_id: &str) -> Result<StatusRecord<CreateResult>> {
        let id = CreateRequestId::parse(request_id)?;
        create_record(self.platform.create_request(&id).await?)
    }

    /// Polls a create request to a terminal status.
    ///
    /// On success, and when `auto_update_project` is set, the new version's alias is recorded
    /// in the project.
    pub async fn wait_for_create_version(
        &self,
        request_id: &str,
        polling: Option<PollingPolicy>,
    ) -> Result<StatusRecord<CreateResult>> {
        let id = CreateRequestId::parse(request_id)?;
        let policy = polling.unwrap_or(self.cfg.create_polling);
        let source = CreateSource {
            platform: Arc::clone(&self.platform),
        };

        let record = self.drive(OperationKind::Create, id.as_str(), &source, policy).await?;

        if record.is_success() && self.cfg.auto_update_project {
            self.record_in_project(&record.payload).await?;
        }
        Ok(record)
    }

    async fn record_in_project(&self, created: &CreateResult) -> Result<()> {
        let id = created
            .subscriber_version_id
            .clone()
            .ok_or(PackageError::MissingField {
                field: "subscriber_version_id",
            })?;
        let mut version =
            PackageVersion::new(Arc::clone(&self.platform), VersionKey::Subscriber(id.clone()));
        let alias = version.alias().await?;

        self.project.record_version(&alias, &id)?;
        info!(%alias, %id, "recorded new version in project");
        Ok(())
    }

    // ---- install ----

    /// Reads an install request as the platform stores it.
    pub async fn install_request(&self, request_id: &str) -> Result<InstallRequestRecord> {
        let id = InstallRequestId::parse(request_id)?;
        Ok(self.platform.install_request(&id).await?)
    }

    /// Install request status; polls to a terminal status unless the policy is single-fetch.
    pub async fn install_status(
        &self,
        request_id: &str,
        polling: Option<PollingPolicy>,
    ) -> Result<StatusRecord<InstallRequestRecord>> {
        let id = InstallRequestId::parse(request_id)?;
        let policy = polling.unwrap_or(self.cfg.install_polling);
        let source = InstallSource {
            platform: Arc::clone(&self.platform),
        };
        self.drive(OperationKind::Install, id.as_str(), &source, policy).await
    }

    /// Installs a subscriber version.
    ///
    /// 1. waits until the version is installable ([`PackageError::NotPublishable`] otherwise)
    /// 2. submits the install request and publishes `Submitted`
    /// 3. waits for the install request per `options.polling`
    pub async fn install(
        &self,
        request: &InstallRequest,
        options: InstallOptions,
    ) -> Result<StatusRecord<InstallRequestRecord>> {
        let version = &request.subscriber_version_id;
        self.wait_for_publish(version, request.installation_key.as_deref(), options.publish_polling)
            .await?;
        debug!(%version, "version is installable");

        let submitted = self.platform.submit_install(request).await?;
        let id = InstallRequestId::parse(&submitted.id)?;
        info!(request_id = %id, %version, "install submitted");
        self.submitted(OperationKind::Install, id.as_str());

        self.install_status(id.as_str(), Some(options.polling)).await
    }

    async fn wait_for_publish(
        &self,
        id: &SubscriberVersionId,
        installation_key: Option<&str>,
        policy: PollingPolicy,
    ) -> Result<()> {
        let source = PublishSource {
            platform: Arc::clone(&self.platform),
            installation_key: installation_key.map(str::to_owned),
        };
        match self
            .drive(OperationKind::Publish, id.as_str(), &source, policy)
            .await
        {
            Ok(record) if record.is_success() => Ok(()),
            Ok(_) | Err(PackageError::Timeout { .. }) => Err(PackageError::NotPublishable {
                id: id.to_string(),
            }),
            Err(e) => Err(e),
        }
    }

    // ---- uninstall ----

    /// Submits an uninstall request and waits for it per `polling`.
    pub async fn uninstall(
        &self,
        id_or_alias: &str,
        polling: Option<PollingPolicy>,
    ) -> Result<StatusRecord<UninstallRequestRecord>> {
        let version = SubscriberVersionId::parse(self.resolve(id_or_alias))?;
        let submitted = self.platform.submit_uninstall(&version).await?;
        let id = UninstallRequestId::parse(&submitted.id)?;
        info!(request_id = %id, %version, "uninstall submitted");
        self.submitted(OperationKind::Uninstall, id.as_str());

        let policy = polling.unwrap_or(self.cfg.uninstall_polling);
        let source = UninstallSource {
            platform: Arc::clone(&self.platform),
        };
        self.drive(OperationKind::Uninstall, id.as_str(), &source, policy).await
    }

    /// Uninstall request, or [`PackageError::UninstallFailed`] with the remote errors.
    pub async fn uninstall_report(&self, request_id: &str) -> Result<UninstallRequestRecord> {
        let id = UninstallRequestId::parse(request_id)?;
        let record = uninstall_record(self.platform.uninstall_request(&id).await?);
        if record.is_error() {
            let errors = self.platform.uninstall_errors(&id).await?;
            return Err(PackageError::UninstallFailed {
                id: id.to_string(),
                errors,
            });
        }
        Ok(record.payload)
    }

    // ---- immediate mutations ----

    /// Sends the set fields of `changes`; nothing is sent when none are set.
    pub async fn update(&self, id_or_alias: &str, changes: VersionChanges) -> Result<PackageVersionId> {
        self.version(id_or_alias)?.update(changes).await
    }

    /// Marks a version released.
    pub async fn promote(&self, id_or_alias: &str) -> Result<PackageVersionId> {
        self.version(id_or_alias)?.promote().await
    }

    /// Deprecates a version.
    pub async fn delete(&self, id_or_alias: &str) -> Result<PackageVersionId> {
        self.version(id_or_alias)?.delete().await
    }

    /// Reverses [`Self::delete`].
    pub async fn undelete(&self, id_or_alias: &str) -> Result<PackageVersionId> {
        self.version(id_or_alias)?.undelete().await
    }

    /// Status report of a version; `verbose` adds its dependencies.
    pub async fn report(&self, id_or_alias: &str, verbose: bool) -> Result<VersionReport> {
        self.version(id_or_alias)?.report(verbose).await
    }

    /// URLs a version needs access to, `None` if it needs none.
    ///
    /// A keyed query the platform refuses as an implementation restriction is retried once
    /// without the key; every other failure propagates.
    pub async fn external_sites(
        &self,
        id_or_alias: &str,
        installation_key: Option<&str>,
    ) -> Result<Option<Vec<String>>> {
        let id = SubscriberVersionId::parse(self.resolve(id_or_alias))?;
        let sites = match self.platform.external_sites(&id, installation_key).await {
            Ok(sites) => sites,
            Err(err) if installation_key.is_some() && err.is_query_restriction() => {
                warn!(%id, error = %err, "keyed external sites query refused, retrying without key");
                self.platform.external_sites(&id, None).await?
            }
            Err(err) => return Err(err.into()),
        };
        Ok(sites.into_urls())
    }

    // ---- helpers ----

    fn resolve(&self, id_or_alias: &str) -> String {
        let value = id_or_alias.trim();
        self.project
            .resolve_alias(value)
            .unwrap_or_else(|| value.to_owned())
    }

    /// Runs the controller and closes the operation for subscribers.
    ///
    /// A `Finished` event is published whenever the controller returned without publishing a
    /// terminal poll event itself.
    async fn drive<P>(
        &self,
        operation: OperationKind,
        id: &str,
        source: &dyn StatusSource<P>,
        policy: PollingPolicy,
    ) -> Result<StatusRecord<P>>
    where
        P: Clone + Send + Sync + 'static,
    {
        let result = self.controller.run(operation, id, source, policy).await;
        let closed = !policy.is_single_fetch()
            && matches!(&result, Ok(_) | Err(PackageError::Timeout { .. }));
        if !closed {
            let ev = Event::new(EventKind::Finished).with_operation(operation, id);
            let ev = match &result {
                Ok(record) => ev.with_status(record.status.clone()),
                Err(e) => ev.with_reason(e.as_label()),
            };
            self.bus().publish(ev);
        }
        result
    }

    fn submitted(&self, operation: OperationKind, id: &str) {
        self.bus()
            .publish(Event::new(EventKind::Submitted).with_operation(operation, id));
    }
}
