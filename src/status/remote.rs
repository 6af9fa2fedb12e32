use std::fmt;

use crate::events::EventKind;

/// Status of a remote asynchronous operation.
///
/// Parsing is lenient about spelling (`InProgress`, `IN_PROGRESS` and `in-progress` are the
/// same status). Values outside the enumeration are kept as [`RemoteStatus::Unrecognized`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RemoteStatus {
    Queued,
    InProgress,
    Initializing,
    VerifyingFeaturesAndSettings,
    VerifyingDependencies,
    VerifyingMetadata,
    FinalizingPackageVersion,
    Success,
    Error,
    /// Raw value the platform reported that this crate does not know.
    Unrecognized(String),
}

/// Classification of a [`RemoteStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Operation still running; keep polling.
    Pending,
    /// Terminal success.
    Succeeded,
    /// Terminal remote error.
    Failed,
}

impl RemoteStatus {
    /// Normalizes a raw status value.
    pub fn parse(raw: &str) -> Self {
        let key: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match key.as_str() {
            "queued" => RemoteStatus::Queued,
            "inprogress" => RemoteStatus::InProgress,
            "initializing" => RemoteStatus::Initializing,
            "verifyingfeaturesandsettings" => RemoteStatus::VerifyingFeaturesAndSettings,
            "verifyingdependencies" => RemoteStatus::VerifyingDependencies,
            "verifyingmetadata" => RemoteStatus::VerifyingMetadata,
            "finalizingpackageversion" => RemoteStatus::FinalizingPackageVersion,
            "success" => RemoteStatus::Success,
            "error" => RemoteStatus::Error,
            _ => RemoteStatus::Unrecognized(raw.to_owned()),
        }
    }

    /// Classifies this status; `None` for [`RemoteStatus::Unrecognized`].
    pub fn phase(&self) -> Option<Phase> {
        match self {
            RemoteStatus::Success => Some(Phase::Succeeded),
            RemoteStatus::Error => Some(Phase::Failed),
            RemoteStatus::Unrecognized(_) => None,
            _ => Some(Phase::Pending),
        }
    }

    /// Lifecycle event published when a poll observes this status.
    pub fn event_kind(&self) -> Option<EventKind> {
        match self {
            RemoteStatus::Queued => Some(EventKind::Enqueued),
            RemoteStatus::Success => Some(EventKind::Success),
            RemoteStatus::Error => Some(EventKind::Error),
            RemoteStatus::Unrecognized(_) => None,
            _ => Some(EventKind::Progress),
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self.phase(), Some(Phase::Succeeded | Phase::Failed))
    }

    /// Canonical spelling of this status.
    pub fn as_str(&self) -> &str {
        match self {
            RemoteStatus::Queued => "Queued",
            RemoteStatus::InProgress => "InProgress",
            RemoteStatus::Initializing => "Initializing",
            RemoteStatus::VerifyingFeaturesAndSettings => "VerifyingFeaturesAndSettings",
            RemoteStatus::VerifyingDependencies => "VerifyingDependencies",
            RemoteStatus::VerifyingMetadata => "VerifyingMetadata",
            RemoteStatus::FinalizingPackageVersion => "FinalizingPackageVersion",
            RemoteStatus::Success => "Success",
            RemoteStatus::Error => "Error",
            RemoteStatus::Unrecognized(raw) => raw,
        }
    }
}

impl fmt::Display for RemoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
