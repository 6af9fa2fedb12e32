//! # Typed record identifiers.
//!
//! Every remote record id is 15 or 18 ASCII alphanumerics and starts with a fixed
//! 3-character prefix naming its kind. Ids are validated when parsed, so a wrong-kind id
//! never reaches the [`Platform`](crate::Platform).
//!
//! ```text
//! 0Ho  package                      PackageId
//! 05i  package version              PackageVersionId
//! 04t  subscriber package version   SubscriberVersionId
//! 08c  version create request       CreateRequestId
//! 0Hf  install request              InstallRequestId
//! 06y  uninstall request            UninstallRequestId
//! ```
//!
//! ## Example
//! ```rust
//! use pkgvisor::{InstallRequestId, SubscriberVersionId};
//!
//! assert!(SubscriberVersionId::parse("04t000000000001AAA").is_ok());
//! assert!(InstallRequestId::parse("04t000000000001AAA").is_err());
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::error::{PackageError, Result};

/// Kind of remote record, identified by its id prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    Package,
    PackageVersion,
    SubscriberVersion,
    CreateRequest,
    InstallRequest,
    UninstallRequest,
}

impl IdKind {
    /// The 3-character prefix of ids of this kind.
    pub const fn prefix(self) -> &'static str {
        match self {
            IdKind::Package => "0Ho",
            IdKind::PackageVersion => "05i",
            IdKind::SubscriberVersion => "04t",
            IdKind::CreateRequest => "08c",
            IdKind::InstallRequest => "0Hf",
            IdKind::UninstallRequest => "06y",
        }
    }

    /// Human-readable kind name.
    pub const fn as_str(self) -> &'static str {
        match self {
            IdKind::Package => "package",
            IdKind::PackageVersion => "package version",
            IdKind::SubscriberVersion => "subscriber package version",
            IdKind::CreateRequest => "version create request",
            IdKind::InstallRequest => "install request",
            IdKind::UninstallRequest => "uninstall request",
        }
    }

    /// True if `value` is a well-formed id of this kind.
    pub fn matches(self, value: &str) -> bool {
        is_well_formed(value) && value.starts_with(self.prefix())
    }
}

fn is_well_formed(value: &str) -> bool {
    matches!(value.len(), 15 | 18) && value.bytes().all(|b| b.is_ascii_alphanumeric())
}

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident => $kind:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(Arc<str>);

        impl $name {
            /// Record kind of this id type.
            pub const KIND: IdKind = IdKind::$kind;

            /// Validates `value` against this kind's prefix and shape.
            pub fn parse(value: impl AsRef<str>) -> Result<Self> {
                let value = value.as_ref().trim();
                if Self::KIND.matches(value) {
                    Ok(Self(Arc::from(value)))
                } else {
                    Err(PackageError::InvalidId {
                        expected: &[IdKind::$kind],
                        value: value.to_owned(),
                    })
                }
            }

            /// Returns the raw id.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = PackageError;

            fn from_str(s: &str) -> Result<Self> {
                Self::parse(s)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.0)
            }
        }
    };
}

record_id!(
    /// Id of a package (the container of versions).
    PackageId => Package
);
record_id!(
    /// Internal id of a package version.
    PackageVersionId => PackageVersion
);
record_id!(
    /// Externally distributed id of a package version.
    SubscriberVersionId => SubscriberVersion
);
record_id!(
    /// Id of an asynchronous version create request.
    CreateRequestId => CreateRequest
);
record_id!(
    /// Id of an asynchronous install request.
    InstallRequestId => InstallRequest
);
record_id!(
    /// Id of an asynchronous uninstall request.
    UninstallRequestId => UninstallRequest
);

/// Either of the two interchangeable keys of a package version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VersionKey {
    Version(PackageVersionId),
    Subscriber(SubscriberVersionId),
}

impl VersionKey {
    /// Parses a package version id (`05i`) or a subscriber package version id (`04t`).
    pub fn parse(value: impl AsRef<str>) -> Result<Self> {
        let value = value.as_ref().trim();
        if IdKind::PackageVersion.matches(value) {
            PackageVersionId::parse(value).map(VersionKey::Version)
        } else if IdKind::SubscriberVersion.matches(value) {
            SubscriberVersionId::parse(value).map(VersionKey::Subscriber)
        } else {
            Err(PackageError::InvalidId {
                expected: &[IdKind::PackageVersion, IdKind::SubscriberVersion],
                value: value.to_owned(),
            })
        }
    }

    /// Returns the raw id.
    pub fn as_str(&self) -> &str {
        match self {
            VersionKey::Version(id) => id.as_str(),
            VersionKey::Subscriber(id) => id.as_str(),
        }
    }
}

impl fmt::Display for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
