//! Error types for the remote client.
//!
//! Network failures, timeouts and missing workflows are kept apart so the
//! editor can tell the user which one happened.

use serde_json::Value as JsonValue;
use std::fmt;
use std::time::Duration;

/// Errors from the workflow persistence service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// The request never got a response.
    Network { details: String },
    /// The request did not complete in time.
    Timeout,
    /// The workflow does not exist.
    NotFound { resource: String },
    /// The service rejected the payload (HTTP 400 or 422).
    Validation { status: u16, message: String },
    /// Any other non-success status.
    Server { status: u16, message: String },
    /// The response body could not be understood.
    MalformedResponse { details: String },
}

impl PersistenceError {
    /// Classifies a non-success HTTP response.
    #[must_use]
    pub fn from_status(status: u16, resource: &str, body: &JsonValue) -> Self {
        match status {
            404 => Self::NotFound {
                resource: resource.to_string(),
            },
            400 | 422 => Self::Validation {
                status,
                message: server_message(status, body),
            },
            _ => Self::Server {
                status,
                message: server_message(status, body),
            },
        }
    }
}

/// Picks the human-readable message out of an error body: `message`, then
/// `error`, then a generic one naming the status.
#[must_use]
pub fn server_message(status: u16, body: &JsonValue) -> String {
    ["message", "error"]
        .into_iter()
        .filter_map(|key| body.get(key).and_then(JsonValue::as_str))
        .find(|message| !message.trim().is_empty())
        .map_or_else(|| format!("server error: {status}"), str::to_string)
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network { details } => write!(f, "network error: {details}"),
            Self::Timeout => write!(f, "request timed out"),
            Self::NotFound { resource } => write!(f, "not found: {resource}"),
            Self::Validation { status, message } => {
                write!(f, "rejected by server ({status}): {message}")
            }
            Self::Server { status, message } => {
                write!(f, "server returned {status}: {message}")
            }
            Self::MalformedResponse { details } => {
                write!(f, "malformed response: {details}")
            }
        }
    }
}

impl std::error::Error for PersistenceError {}

/// Why a workflow run ended in failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunFailure {
    /// The workflow has not been created remotely yet.
    MissingId,
    /// Saving before execution failed; execution was not attempted.
    Save(PersistenceError),
    /// No result arrived before the local deadline.
    Timeout { after: Duration },
    /// The execute endpoint answered with an error status.
    Http { status: u16, message: String },
    /// The execute endpoint does not know the workflow.
    NotFound,
    /// The execute request never got a response.
    NoResponse { details: String },
    Unknown { details: String },
}

impl From<PersistenceError> for RunFailure {
    fn from(error: PersistenceError) -> Self {
        match error {
            PersistenceError::Network { details } => Self::NoResponse { details },
            PersistenceError::Timeout => Self::Timeout {
                after: Duration::ZERO,
            },
            PersistenceError::NotFound { .. } => Self::NotFound,
            PersistenceError::Validation { status, message }
            | PersistenceError::Server { status, message } => Self::Http { status, message },
            PersistenceError::MalformedResponse { details } => Self::Unknown { details },
        }
    }
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingId => write!(f, "workflow must be saved before it can run"),
            Self::Save(e) => write!(f, "failed to save workflow: {e}"),
            Self::Timeout { after } if after.is_zero() => write!(f, "execution timed out"),
            Self::Timeout { after } => {
                write!(f, "execution timed out after {}s", after.as_secs())
            }
            Self::Http { status, message } => {
                write!(f, "execution failed ({status}): {message}")
            }
            Self::NotFound => write!(f, "workflow not found"),
            Self::NoResponse { details } => write!(f, "no response from server: {details}"),
            Self::Unknown { details } => write!(f, "execution failed: {details}"),
        }
    }
}

impl std::error::Error for RunFailure {}
