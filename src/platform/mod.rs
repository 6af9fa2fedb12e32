//! # Remote platform seam.
//!
//! [`Platform`] is everything the lifecycle needs from the remote service: request submission,
//! status and record queries, and partial record updates. Implementations own transport,
//! authentication and wire decoding; they report failures as [`RemoteError`], which the facade
//! converts (and enriches) into [`PackageError`](crate::PackageError).
//!
//! Every method is a single request: no retries, no polling. Polling is the
//! [`Controller`](crate::Controller)'s job.

mod records;

pub use records::{
    CompileScope, CreateOptions, CreateRequestRecord, CreateResult, ExternalSites,
    InstallRequest, InstallRequestRecord, PublishCheck, SaveResult, SecurityType,
    UninstallRequestRecord, UpgradeType, VersionChanges, VersionRecord, VersionReport,
    VersionUpdate,
};
pub(crate) use records::INSTALL_STATUS_UNKNOWN;

use async_trait::async_trait;

use crate::error::RemoteError;
use crate::ids::{
    CreateRequestId, InstallRequestId, PackageVersionId, SubscriberVersionId, UninstallRequestId,
    VersionKey,
};

/// Result of a platform call.
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Remote package platform.
#[async_trait]
pub trait Platform: Send + Sync + 'static {
    /// Submits a version create request.
    async fn submit_create(&self, options: &CreateOptions) -> RemoteResult<CreateRequestRecord>;

    /// Reads a version create request.
    async fn create_request(&self, id: &CreateRequestId) -> RemoteResult<CreateRequestRecord>;

    /// Reads a package version by either of its ids.
    async fn version(&self, key: &VersionKey) -> RemoteResult<VersionRecord>;

    /// Applies a partial update to a package version.
    async fn update_version(&self, update: &VersionUpdate) -> RemoteResult<SaveResult>;

    /// Checks whether a subscriber version can be installed yet.
    async fn publish_state(
        &self,
        id: &SubscriberVersionId,
        installation_key: Option<&str>,
    ) -> RemoteResult<PublishCheck>;

    /// Submits an install request.
    async fn submit_install(&self, request: &InstallRequest) -> RemoteResult<InstallRequestRecord>;

    /// Reads an install request.
    async fn install_request(&self, id: &InstallRequestId) -> RemoteResult<InstallRequestRecord>;

    /// Submits an uninstall request.
    async fn submit_uninstall(&self, id: &SubscriberVersionId)
    -> RemoteResult<UninstallRequestRecord>;

    /// Reads an uninstall request.
    async fn uninstall_request(
        &self,
        id: &UninstallRequestId,
    ) -> RemoteResult<UninstallRequestRecord>;

    /// Error messages recorded for a failed uninstall request.
    async fn uninstall_errors(&self, id: &UninstallRequestId) -> RemoteResult<Vec<String>>;

    /// Remote site settings and trusted sites of a subscriber version.
    ///
    /// With `installation_key` the query is scoped to the key; platforms that cannot serve that
    /// shape fail with an "implementation restriction" message (code `MALFORMED_QUERY` when a
    /// code is reported).
    async fn external_sites(
        &self,
        id: &SubscriberVersionId,
        installation_key: Option<&str>,
    ) -> RemoteResult<ExternalSites>;

    /// Status report of a package version.
    async fn version_report(
        &self,
        id: &PackageVersionId,
        verbose: bool,
    ) -> RemoteResult<VersionReport>;
}
