//! Error types used by the package lifecycle runtime.
//!
//! - [`PackageError`] is what every facade and controller operation returns.
//! - [`RemoteError`] is what a [`Platform`](crate::Platform) implementation returns; it is
//!   converted into [`PackageError::Remote`] through `From`, which is where the
//!   permission remediation hint is attached.
//!
//! Both types provide `as_label` for logs/metrics.

use std::time::Duration;
use thiserror::Error;

use crate::events::OperationKind;
use crate::ids::IdKind;

/// Crate-wide result alias.
pub type Result<T, E = PackageError> = std::result::Result<T, E>;

/// Hint appended to remote errors that look like a permission restriction.
pub const SUPPORT_HINT: &str =
    "Contact platform support to enable the required packaging permissions for this org.";

/// Message fragments that identify a permission restriction.
const PERMISSION_PATTERNS: &[&str] = &[
    "insufficient access",
    "insufficient_access",
    "does not have permission",
    "not authorized",
    "permission to",
];

/// Message fragment of the query restriction that allows the keyless external-sites retry.
const QUERY_RESTRICTION: &str = "implementation restriction";

/// Error code the platform reports the query restriction with.
const QUERY_RESTRICTION_CODE: &str = "MALFORMED_QUERY";

/// # Failure reported by the remote platform.
///
/// Carries the raw message and an optional machine code (e.g. `INVALID_FIELD`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RemoteError {
    /// Optional error code as reported by the platform.
    pub code: Option<String>,
    /// Human-readable message as reported by the platform.
    pub message: String,
}

impl RemoteError {
    /// Creates a remote error without a code.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    /// Attaches a platform error code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// True if the message or code matches a known permission restriction.
    pub fn is_permission_restriction(&self) -> bool {
        let message = self.message.to_ascii_lowercase();
        let code = self.code.as_deref().unwrap_or_default().to_ascii_lowercase();
        PERMISSION_PATTERNS
            .iter()
            .any(|p| message.contains(p) || code.contains(p))
    }

    /// True if the platform refused the query shape (keyed lookups it cannot serve).
    ///
    /// When a code is present it must be `MALFORMED_QUERY`.
    pub fn is_query_restriction(&self) -> bool {
        let code_matches = self
            .code
            .as_deref()
            .is_none_or(|c| c.eq_ignore_ascii_case(QUERY_RESTRICTION_CODE));
        code_matches && self.message.to_ascii_lowercase().contains(QUERY_RESTRICTION)
    }
}

/// # Errors produced by package lifecycle operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PackageError {
    /// Caller supplied an id that is malformed or carries the wrong prefix.
    #[error("invalid id {value:?}: expected {}", describe_kinds(.expected))]
    InvalidId {
        /// Id kinds that would have been accepted.
        expected: &'static [IdKind],
        /// The rejected value.
        value: String,
    },

    /// A submission, query, or mutation failed on the remote side.
    #[error("{message}{}", hint_suffix(.hint))]
    Remote {
        /// Remote message.
        message: String,
        /// Remediation hint, set for permission restrictions.
        hint: Option<&'static str>,
    },

    /// Polling exhausted its budget without reaching a terminal status.
    #[error("{kind} operation {operation_id} did not finish within {timeout:?}")]
    Timeout {
        /// Operation family that timed out.
        kind: OperationKind,
        /// Remote operation id.
        operation_id: String,
        /// Configured polling budget.
        timeout: Duration,
    },

    /// Remote reported a status outside the known enumeration.
    #[error("{kind} operation {operation_id} reported unrecognized status {status:?}")]
    UnrecognizedStatus {
        /// Operation family.
        kind: OperationKind,
        /// Remote operation id.
        operation_id: String,
        /// Raw status value.
        status: String,
    },

    /// A field-level update was rejected.
    #[error("update rejected: {}", .errors.join(", "))]
    UpdateRejected {
        /// Every field error reported by the platform.
        errors: Vec<String>,
    },

    /// The subscriber package version is not installable yet.
    #[error("subscriber package version {id} is not yet available for install")]
    NotPublishable {
        /// Subscriber package version id.
        id: String,
    },

    /// An uninstall request reached the remote `Error` status.
    #[error("uninstall request {id} failed: {}", .errors.join(", "))]
    UninstallFailed {
        /// Uninstall request id.
        id: String,
        /// Error messages reported for the request.
        errors: Vec<String>,
    },

    /// A remote record lacks a value the operation needs.
    #[error("package version record has no {field}")]
    MissingField {
        /// Name of the missing field.
        field: &'static str,
    },

    /// Writing project metadata failed.
    #[error("project metadata update failed: {message}")]
    Project {
        /// Underlying message.
        message: String,
    },
}

impl PackageError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use pkgvisor::PackageError;
    ///
    /// let err = PackageError::UpdateRejected { errors: vec!["bad tag".into()] };
    /// assert_eq!(err.as_label(), "update_rejected");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            PackageError::InvalidId { .. } => "invalid_id",
            PackageError::Remote { .. } => "remote_rejected",
            PackageError::Timeout { .. } => "poll_timeout",
            PackageError::UnrecognizedStatus { .. } => "unrecognized_status",
            PackageError::UpdateRejected { .. } => "update_rejected",
            PackageError::NotPublishable { .. } => "not_publishable",
            PackageError::UninstallFailed { .. } => "uninstall_failed",
            PackageError::MissingField { .. } => "missing_field",
            PackageError::Project { .. } => "project_write_failed",
        }
    }

    /// Returns a compact message with the error details, for log lines.
    pub fn as_message(&self) -> String {
        match self {
            PackageError::InvalidId { value, .. } => format!("invalid id: {value}"),
            PackageError::Remote { message, .. } => format!("remote: {message}"),
            PackageError::Timeout {
                kind,
                operation_id,
                timeout,
            } => format!("{kind} {operation_id} timeout: {timeout:?}"),
            PackageError::UnrecognizedStatus {
                kind,
                operation_id,
                status,
            } => format!("{kind} {operation_id} status: {status}"),
            PackageError::UpdateRejected { errors } => format!("rejected: {}", errors.join(", ")),
            PackageError::NotPublishable { id } => format!("not publishable: {id}"),
            PackageError::UninstallFailed { id, errors } => {
                format!("uninstall {id} failed: {}", errors.join(", "))
            }
            PackageError::MissingField { field } => format!("missing field: {field}"),
            PackageError::Project { message } => format!("project: {message}"),
        }
    }

    /// Indicates whether the failure happened before anything was sent to the platform.
    pub fn is_validation(&self) -> bool {
        matches!(self, PackageError::InvalidId { .. })
    }
}

impl From<RemoteError> for PackageError {
    fn from(err: RemoteError) -> Self {
        let hint = err.is_permission_restriction().then_some(SUPPORT_HINT);
        PackageError::Remote {
            message: err.message,
            hint,
        }
    }
}

fn hint_suffix(hint: &Option<&'static str>) -> String {
    match hint {
        Some(h) => format!(" {h}"),
        None => String::new(),
    }
}

fn describe_kinds(kinds: &[IdKind]) -> String {
    kinds
        .iter()
        .map(|k| format!("{} ({})", k.as_str(), k.prefix()))
        .collect::<Vec<_>>()
        .join(" or ")
}
