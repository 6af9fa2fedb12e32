//! Records exchanged with the remote platform.
//!
//! Request records keep the raw wire status as a `String`; the facade normalizes it with
//! [`RemoteStatus::parse`](crate::RemoteStatus::parse) when building a
//! [`StatusRecord`](crate::StatusRecord).

use serde::Serialize;

use crate::ids::{PackageId, PackageVersionId, SubscriberVersionId};

/// Wire value the install endpoint reports while it has not classified a request yet.
pub(crate) const INSTALL_STATUS_UNKNOWN: &str = "UNKNOWN";

/// Publish validation value meaning the version is not installable yet.
pub(crate) const PACKAGE_UNAVAILABLE: &str = "PACKAGE_UNAVAILABLE";

/// Parameters of a version create request, passed to the platform as-is.
#[derive(Debug, Clone)]
pub struct CreateOptions {
    pub package_id: PackageId,
    /// `major.minor.patch.build`, where build may be `NEXT`.
    pub version_number: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub branch: Option<String>,
    pub tag: Option<String>,
    pub installation_key: Option<String>,
    pub skip_validation: bool,
}

impl CreateOptions {
    pub fn new(package_id: PackageId) -> Self {
        Self {
            package_id,
            version_number: None,
            name: None,
            description: None,
            branch: None,
            tag: None,
            installation_key: None,
            skip_validation: false,
        }
    }
}

/// Version create request as stored by the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateRequestRecord {
    pub id: String,
    /// Raw status value.
    pub status: String,
    pub package_id: Option<String>,
    pub package_version_id: Option<String>,
    pub subscriber_version_id: Option<String>,
    pub branch: Option<String>,
    pub tag: Option<String>,
    pub errors: Vec<String>,
}

/// Payload of a create status record: the ids of the version being built.
///
/// Version ids are only known once the request succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateResult {
    pub package_id: Option<PackageId>,
    pub package_version_id: Option<PackageVersionId>,
    pub subscriber_version_id: Option<SubscriberVersionId>,
    pub branch: Option<String>,
    pub tag: Option<String>,
}

/// A package version as stored by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    pub id: PackageVersionId,
    pub subscriber_version_id: SubscriberVersionId,
    pub package_id: PackageId,
    pub package_name: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub build: u32,
    pub branch: Option<String>,
    pub tag: Option<String>,
    pub is_released: bool,
    pub is_deprecated: bool,
}

impl VersionRecord {
    /// `major.minor.patch-build`.
    pub fn version_number(&self) -> String {
        format!("{}.{}.{}-{}", self.major, self.minor, self.patch, self.build)
    }

    /// Project alias: `<package name>@<major>.<minor>.<patch>-<build>[-<branch>]`.
    pub fn alias(&self) -> String {
        match self.branch.as_deref().filter(|b| !b.is_empty()) {
            Some(branch) => format!("{}@{}-{branch}", self.package_name, self.version_number()),
            None => format!("{}@{}", self.package_name, self.version_number()),
        }
    }
}

/// Caller-specified changes to a package version.
///
/// Only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VersionChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_released: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_deprecated: Option<bool>,
}

impl VersionChanges {
    pub fn name(mut self, v: impl Into<String>) -> Self {
        self.name = Some(v.into());
        self
    }

    pub fn description(mut self, v: impl Into<String>) -> Self {
        self.description = Some(v.into());
        self
    }

    pub fn branch(mut self, v: impl Into<String>) -> Self {
        self.branch = Some(v.into());
        self
    }

    pub fn tag(mut self, v: impl Into<String>) -> Self {
        self.tag = Some(v.into());
        self
    }

    pub fn install_key(mut self, v: impl Into<String>) -> Self {
        self.install_key = Some(v.into());
        self
    }

    pub fn released(mut self, v: bool) -> Self {
        self.is_released = Some(v);
        self
    }

    pub fn deprecated(mut self, v: bool) -> Self {
        self.is_deprecated = Some(v);
        self
    }

    /// True if no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Partial update sent to [`Platform::update_version`](crate::Platform::update_version).
///
/// Serializes to the platform's record shape, e.g. `{"Id":"05i...","Tag":"rc1"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionUpdate {
    #[serde(rename = "Id")]
    pub id: PackageVersionId,
    #[serde(flatten)]
    pub changes: VersionChanges,
}

/// Outcome of a record save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveResult {
    pub id: Option<String>,
    pub success: bool,
    pub errors: Vec<String>,
}

/// Installability of a subscriber version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishCheck {
    /// Raw validation value; `PACKAGE_UNAVAILABLE` while the version is still publishing.
    pub validation: Option<String>,
}

impl PublishCheck {
    pub fn is_available(&self) -> bool {
        self.validation.as_deref() != Some(PACKAGE_UNAVAILABLE)
    }
}

/// Who gets access to the installed components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SecurityType {
    AllUsers,
    #[default]
    AdminsOnly,
}

impl SecurityType {
    pub const fn as_str(self) -> &'static str {
        match self {
            SecurityType::AllUsers => "Full",
            SecurityType::AdminsOnly => "None",
        }
    }
}

/// How components removed from the new version are treated on upgrade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpgradeType {
    Delete,
    DeprecateOnly,
    #[default]
    Mixed,
}

impl UpgradeType {
    pub const fn as_str(self) -> &'static str {
        match self {
            UpgradeType::Delete => "delete-only",
            UpgradeType::DeprecateOnly => "deprecate-only",
            UpgradeType::Mixed => "mixed-mode",
        }
    }
}

/// Which code is compiled during install.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompileScope {
    #[default]
    All,
    Package,
}

impl CompileScope {
    pub const fn as_str(self) -> &'static str {
        match self {
            CompileScope::All => "all",
            CompileScope::Package => "package",
        }
    }
}

/// Install request parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    pub subscriber_version_id: SubscriberVersionId,
    pub installation_key: Option<String>,
    pub security_type: SecurityType,
    pub upgrade_type: UpgradeType,
    pub compile_scope: CompileScope,
    /// Approve the version's remote site settings and trusted sites during install.
    pub enable_remote_sites: bool,
}

impl InstallRequest {
    pub fn new(subscriber_version_id: SubscriberVersionId) -> Self {
        Self {
            subscriber_version_id,
            installation_key: None,
            security_type: SecurityType::default(),
            upgrade_type: UpgradeType::default(),
            compile_scope: CompileScope::default(),
            enable_remote_sites: false,
        }
    }

    pub fn with_installation_key(mut self, key: impl Into<String>) -> Self {
        self.installation_key = Some(key.into());
        self
    }
}

/// Install request as stored by the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallRequestRecord {
    pub id: String,
    /// Raw status value; `UNKNOWN` is reported as in progress.
    pub status: String,
    pub subscriber_version_id: Option<String>,
    pub errors: Vec<String>,
}

/// Uninstall request as stored by the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UninstallRequestRecord {
    pub id: String,
    /// Raw status value.
    pub status: String,
    pub subscriber_version_id: Option<String>,
}

/// External sites a version needs access to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalSites {
    pub remote_site_urls: Vec<String>,
    pub csp_trusted_sites: Vec<String>,
}

impl ExternalSites {
    /// All URLs, `None` when there are none.
    pub fn into_urls(self) -> Option<Vec<String>> {
        let mut urls = self.remote_site_urls;
        urls.extend(self.csp_trusted_sites);
        (!urls.is_empty()).then_some(urls)
    }
}

/// Status report of a package version.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionReport {
    pub version: VersionRecord,
    pub validation_skipped: bool,
    pub code_coverage: Option<f64>,
    pub has_passed_code_coverage_check: Option<bool>,
    pub ancestor_id: Option<String>,
    /// Subscriber version ids this version depends on; only filled for verbose reports.
    pub dependencies: Vec<String>,
}
