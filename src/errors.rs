//! Error types for the model runner client
//!
//! Failures are classified once, at the lowest layer that knows enough:
//! the transport layer for 503, the raw listing helper for 404 and the
//! stream decoders for protocol violations. Everything above adds context
//! but never re-classifies.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for daemon client operations
#[derive(Error, Debug)]
pub enum ClientError {
    /// The daemon answered 404 for a model-scoped query
    #[error("model not found: {model}")]
    NotFound { model: String },

    /// The daemon is not reachable or answered 503
    #[error("service unavailable: the model runner is not running")]
    ServiceUnavailable,

    /// A streamed message was malformed or outside the expected schema
    #[error("{0}")]
    ProtocolViolation(String),

    /// A short ID could not be resolved, or an ID was malformed
    #[error("invalid model name: {0}")]
    InvalidReference(String),

    /// Transport, decode and status failures with route context
    #[error("{message}")]
    Generic {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

/// Field-less tag of a [`ClientError`], for matching on the kind only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    ServiceUnavailable,
    ProtocolViolation,
    InvalidReference,
    Generic,
}

impl ClientError {
    /// Generic error with no underlying cause
    pub fn generic(message: impl Into<String>) -> Self {
        ClientError::Generic {
            message: message.into(),
            source: None,
        }
    }

    /// Generic error wrapping an underlying cause
    ///
    /// The cause's text is appended to `context`, so the rendered message
    /// stands on its own without walking the source chain.
    pub fn wrap<E>(context: impl AsRef<str>, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ClientError::Generic {
            message: format!("{}: {}", context.as_ref(), err),
            source: Some(Box::new(err)),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::NotFound { .. } => ErrorKind::NotFound,
            ClientError::ServiceUnavailable => ErrorKind::ServiceUnavailable,
            ClientError::ProtocolViolation(_) => ErrorKind::ProtocolViolation,
            ClientError::InvalidReference(_) => ErrorKind::InvalidReference,
            ClientError::Generic { .. } => ErrorKind::Generic,
        }
    }

    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind() == kind
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Failure of a pull or push progress stream
///
/// Carries whether any progress line was delivered before the failure so
/// callers can tidy up a partially drawn progress display.
#[derive(Error, Debug)]
#[error("{error}")]
pub struct ProgressFailure {
    pub progress_shown: bool,
    pub error: ClientError,
}

impl ProgressFailure {
    pub fn new(error: ClientError, progress_shown: bool) -> Self {
        Self {
            progress_shown,
            error,
        }
    }
}

impl From<ClientError> for ProgressFailure {
    fn from(error: ClientError) -> Self {
        Self::new(error, false)
    }
}

impl From<ProgressFailure> for ClientError {
    fn from(failure: ProgressFailure) -> Self {
        failure.error
    }
}

/// Failure part-way through a batch removal
///
/// `removed` holds the success text of every model deleted before the
/// failing one; models after it were not attempted.
#[derive(Error, Debug)]
#[error("{error}")]
pub struct RemoveFailure {
    pub removed: String,
    pub error: ClientError,
}

impl From<RemoveFailure> for ClientError {
    fn from(failure: RemoveFailure) -> Self {
        failure.error
    }
}
