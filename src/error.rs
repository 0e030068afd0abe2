use std::fmt;
use std::time::Duration;

/// Coarse error classes used when rendering a failed service call.
///
/// Expected absence is not listed here: a missing record is a successful
/// outcome (`Settled::Absent`), never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller's fault: malformed body, id mismatch
    ClientError,
    /// The service declines the requested operation
    UnsupportedOperation,
    /// Anything unexpected inside a service, including a result that never settled
    InternalFailure,
}

/// Error channel of every service operation
///
/// Returned inside a [`Settled::Failed`](crate::pending::Settled::Failed). The
/// Response Adapter is the only component that turns these into status codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Request body could not be decoded into the resource's record type
    BadRequest(String),
    /// `PUT /{resource}/{id}` carried a record whose own id differs from `id`
    IdMismatch {
        /// Id taken from the request path
        id: String,
        /// Id carried by the record in the body
        record_id: String,
    },
    /// The service does not implement this operation
    Unsupported,
    /// Unexpected failure inside a service
    Internal(String),
    /// The result did not settle within the configured wait
    TimedOut(Duration),
}

impl ApiError {
    /// Classify this error into one of the three failure kinds.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::BadRequest(_) | ApiError::IdMismatch { .. } => ErrorKind::ClientError,
            ApiError::Unsupported => ErrorKind::UnsupportedOperation,
            ApiError::Internal(_) | ApiError::TimedOut(_) => ErrorKind::InternalFailure,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(message) => write!(f, "{message}"),
            ApiError::IdMismatch { id, record_id } => {
                write!(f, "ID mismatch: id=[{id}] vs item.id=[{record_id}]")
            }
            ApiError::Unsupported => write!(f, "Operation not supported"),
            ApiError::Internal(message) => write!(f, "{message}"),
            ApiError::TimedOut(waited) => {
                write!(f, "Result not ready after {} ms", waited.as_millis())
            }
        }
    }
}

impl std::error::Error for ApiError {}

/// Registry construction error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Resource names must be a single non-empty path segment
    InvalidName {
        /// The rejected name
        name: String,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::InvalidName { name } => write!(
                f,
                "Invalid resource name '{name}': expected a single non-empty path segment"
            ),
        }
    }
}

impl std::error::Error for RegistryError {}
