use installer_core::{LaunchError, LaunchFailureKind};
use thiserror::Error;

/// A failed request against the installer API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct RequestError {
    pub kind: LaunchFailureKind,
    pub message: String,
}

impl RequestError {
    pub(crate) fn new(kind: LaunchFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<RequestError> for LaunchError {
    fn from(err: RequestError) -> Self {
        LaunchError::new(err.kind, err.message)
    }
}

/// How one connection to the event stream ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEnd {
    /// A terminal record (done or failed) was delivered.
    Terminal,
    /// The connection ended first. `records` counts what was delivered
    /// before that; `error` is set when reading the body failed, stalled
    /// past the idle timeout or overflowed the record limit.
    Disconnected {
        records: usize,
        error: Option<RequestError>,
    },
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> RequestError {
    if err.is_timeout() {
        return RequestError::new(LaunchFailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return RequestError::new(LaunchFailureKind::InvalidResponse, err.to_string());
    }
    RequestError::new(LaunchFailureKind::Network, err.to_string())
}
