//! Platform-backed [`StatusSource`]s for the four polled operations.
//!
//! Each source turns one platform read into a normalized [`StatusRecord`]:
//!
//! | source              | platform call        | status mapping                          |
//! |---------------------|----------------------|-----------------------------------------|
//! | `CreateSource`      | `create_request`     | wire value                              |
//! | `PublishSource`     | `publish_state`      | available → Success, else InProgress    |
//! | `InstallSource`     | `install_request`    | wire value, `UNKNOWN` → InProgress      |
//! | `UninstallSource`   | `uninstall_request`  | wire value                              |

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::StatusSource;
use crate::error::Result;
use crate::ids::{
    CreateRequestId, InstallRequestId, PackageId, PackageVersionId, SubscriberVersionId,
    UninstallRequestId,
};
use crate::platform::{
    CreateRequestRecord, CreateResult, INSTALL_STATUS_UNKNOWN, InstallRequestRecord, Platform,
    UninstallRequestRecord,
};
use crate::status::{RemoteStatus, StatusRecord};

pub(crate) struct CreateSource {
    pub(crate) platform: Arc<dyn Platform>,
}

#[async_trait]
impl StatusSource<CreateResult> for CreateSource {
    async fn fetch(&self, operation_id: &str) -> Result<StatusRecord<CreateResult>> {
        let id = CreateRequestId::parse(operation_id)?;
        let request = self.platform.create_request(&id).await?;
        create_record(request)
    }
}

/// Normalizes a create request; version ids are validated as they arrive.
pub(crate) fn create_record(request: CreateRequestRecord) -> Result<StatusRecord<CreateResult>> {
    let payload = CreateResult {
        package_id: request.package_id.as_deref().map(PackageId::parse).transpose()?,
        package_version_id: request
            .package_version_id
            .as_deref()
            .map(PackageVersionId::parse)
            .transpose()?,
        subscriber_version_id: request
            .subscriber_version_id
            .as_deref()
            .map(SubscriberVersionId::parse)
            .transpose()?,
        branch: request.branch,
        tag: request.tag,
    };
    Ok(StatusRecord::new(request.id, RemoteStatus::parse(&request.status), payload)
        .with_errors(request.errors))
}

pub(crate) struct PublishSource {
    pub(crate) platform: Arc<dyn Platform>,
    pub(crate) installation_key: Option<String>,
}

#[async_trait]
impl StatusSource<()> for PublishSource {
    async fn fetch(&self, operation_id: &str) -> Result<StatusRecord<()>> {
        let id = SubscriberVersionId::parse(operation_id)?;
        let check = self
            .platform
            .publish_state(&id, self.installation_key.as_deref())
            .await?;
        let status = if check.is_available() {
            RemoteStatus::Success
        } else {
            RemoteStatus::InProgress
        };
        Ok(StatusRecord::new(operation_id, status, ()))
    }
}

pub(crate) struct InstallSource {
    pub(crate) platform: Arc<dyn Platform>,
}

#[async_trait]
impl StatusSource<InstallRequestRecord> for InstallSource {
    async fn fetch(&self, operation_id: &str) -> Result<StatusRecord<InstallRequestRecord>> {
        let id = InstallRequestId::parse(operation_id)?;
        let request = self.platform.install_request(&id).await?;
        Ok(install_record(request))
    }
}

pub(crate) fn install_record(request: InstallRequestRecord) -> StatusRecord<InstallRequestRecord> {
    let status = if request.status.eq_ignore_ascii_case(INSTALL_STATUS_UNKNOWN) {
        RemoteStatus::InProgress
    } else {
        RemoteStatus::parse(&request.status)
    };
    StatusRecord::new(request.id.clone(), status, request.clone()).with_errors(request.errors)
}

pub(crate) struct UninstallSource {
    pub(crate) platform: Arc<dyn Platform>,
}

#[async_trait]
impl StatusSource<UninstallRequestRecord> for UninstallSource {
    async fn fetch(&self, operation_id: &str) -> Result<StatusRecord<UninstallRequestRecord>> {
        let id = UninstallRequestId::parse(operation_id)?;
        let request = self.platform.uninstall_request(&id).await?;
        Ok(uninstall_record(request))
    }
}

pub(crate) fn uninstall_record(
    request: UninstallRequestRecord,
) -> StatusRecord<UninstallRequestRecord> {
    let status = RemoteStatus::parse(&request.status);
    StatusRecord::new(request.id.clone(), status, request)
}
