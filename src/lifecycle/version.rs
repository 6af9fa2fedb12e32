//! # PackageVersion: one package version and its lazily loaded record.
//!
//! The entity is keyed by exactly one of its two ids ([`VersionKey`]). The remote record is
//! fetched on first access and cached until [`PackageVersion::refresh`] or a successful save.
//!
//! ```text
//! Unloaded ──record()──► Loaded(VersionRecord)
//!    ▲                        │
//!    └── refresh() / save ────┘
//! ```
//!
//! Loading takes `&mut self`, so one instance cannot be refreshed from two tasks at once.

use std::sync::Arc;

use tracing::debug;

use crate::error::{PackageError, Result};
use crate::ids::{PackageVersionId, SubscriberVersionId, VersionKey};
use crate::platform::{Platform, VersionChanges, VersionRecord, VersionReport, VersionUpdate};

/// Cached remote record.
#[derive(Debug, Clone, Default)]
pub enum VersionCache {
    #[default]
    Unloaded,
    Loaded(VersionRecord),
}

/// A package version on the remote platform.
pub struct PackageVersion {
    platform: Arc<dyn Platform>,
    key: VersionKey,
    cache: VersionCache,
}

impl PackageVersion {
    /// Creates an unloaded entity; nothing is fetched yet.
    pub fn new(platform: Arc<dyn Platform>, key: VersionKey) -> Self {
        Self {
            platform,
            key,
            cache: VersionCache::Unloaded,
        }
    }

    /// Key this entity was created with.
    pub fn key(&self) -> &VersionKey {
        &self.key
    }

    pub fn cache(&self) -> &VersionCache {
        &self.cache
    }

    /// Returns the record, loading it on first access.
    pub async fn record(&mut self) -> Result<&VersionRecord> {
        if let VersionCache::Unloaded = self.cache {
            debug!(key = %self.key, "loading package version");
            let record = self.platform.version(&self.key).await?;
            self.cache = VersionCache::Loaded(record);
        }
        match &self.cache {
            VersionCache::Loaded(record) => Ok(record),
            VersionCache::Unloaded => Err(PackageError::MissingField { field: "record" }),
        }
    }

    /// Drops the cached record and loads it again.
    pub async fn refresh(&mut self) -> Result<&VersionRecord> {
        self.cache = VersionCache::Unloaded;
        self.record().await
    }

    /// Package version id; loads the record only when keyed by subscriber id.
    pub async fn version_id(&mut self) -> Result<PackageVersionId> {
        if let VersionKey::Version(id) = &self.key {
            return Ok(id.clone());
        }
        Ok(self.record().await?.id.clone())
    }

    /// Subscriber version id; loads the record only when keyed by package version id.
    pub async fn subscriber_version_id(&mut self) -> Result<SubscriberVersionId> {
        if let VersionKey::Subscriber(id) = &self.key {
            return Ok(id.clone());
        }
        Ok(self.record().await?.subscriber_version_id.clone())
    }

    /// Project alias of this version, see [`VersionRecord::alias`].
    pub async fn alias(&mut self) -> Result<String> {
        let record = self.record().await?;
        if record.package_name.is_empty() {
            return Err(PackageError::MissingField {
                field: "package_name",
            });
        }
        Ok(record.alias())
    }

    /// Sends the set fields of `changes`.
    ///
    /// No fields set → no remote call. A rejected save is
    /// [`PackageError::UpdateRejected`] carrying every field error.
    pub async fn update(&mut self, changes: VersionChanges) -> Result<PackageVersionId> {
        let id = self.version_id().await?;
        if changes.is_empty() {
            debug!(%id, "no changes to send");
            return Ok(id);
        }

        let update = VersionUpdate { id, changes };
        let saved = self.platform.update_version(&update).await?;
        if !saved.success {
            return Err(PackageError::UpdateRejected {
                errors: saved.errors,
            });
        }
        self.cache = VersionCache::Unloaded;
        Ok(update.id)
    }

    /// Marks the version released.
    pub async fn promote(&mut self) -> Result<PackageVersionId> {
        self.update(VersionChanges::default().released(true)).await
    }

    /// Deprecates the version.
    pub async fn delete(&mut self) -> Result<PackageVersionId> {
        self.update(VersionChanges::default().deprecated(true)).await
    }

    /// Reverses [`Self::delete`].
    pub async fn undelete(&mut self) -> Result<PackageVersionId> {
        self.update(VersionChanges::default().deprecated(false)).await
    }

    pub async fn report(&mut self, verbose: bool) -> Result<VersionReport> {
        let id = self.version_id().await?;
        Ok(self.platform.version_report(&id, verbose).await?)
    }
}
