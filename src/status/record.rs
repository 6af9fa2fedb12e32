use super::remote::RemoteStatus;

/// Normalized result of one poll.
///
/// A record is never mutated after it is returned; the next poll produces a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusRecord<P> {
    /// Normalized remote status.
    pub status: RemoteStatus,
    /// Id of the remote operation this record describes.
    pub operation_id: String,
    /// Error messages the platform attached to the operation (usually on `Error`).
    pub errors: Vec<String>,
    /// Operation-specific data (e.g. the ids of a newly created version).
    pub payload: P,
}

impl<P> StatusRecord<P> {
    /// Creates a record without error detail.
    pub fn new(operation_id: impl Into<String>, status: RemoteStatus, payload: P) -> Self {
        Self {
            status,
            operation_id: operation_id.into(),
            errors: Vec::new(),
            payload,
        }
    }

    /// Attaches remote error messages.
    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = errors;
        self
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        self.status == RemoteStatus::Success
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.status == RemoteStatus::Error
    }

    /// Errors joined into one line, `None` if there are none.
    pub fn error_summary(&self) -> Option<String> {
        (!self.errors.is_empty()).then(|| self.errors.join(", "))
    }
}
