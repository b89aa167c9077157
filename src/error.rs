//! Error taxonomy for the console
//!
//! Nothing here is fatal: every error ends up either on the status line
//! (registry failures) or inside a `ResponseRecord` (preflight failures).

use thiserror::Error;

/// A CRUD or refresh call against the Endpoint Registry Service failed,
/// or was rejected locally before being sent.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("registry unreachable: {0}")]
    Transport(String),
    #[error("registry answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("registry sent an unreadable payload: {0}")]
    Decode(String),
    #[error("{0}")]
    Validation(String),
}

impl From<reqwest::Error> for RegistryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RegistryError::Decode(err.to_string())
        } else {
            RegistryError::Transport(err.to_string())
        }
    }
}

/// A request that could not be built, detected before any network call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PreflightError {
    #[error("Invalid JSON body: {0}")]
    InvalidBody(String),
    #[error("Invalid URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Invalid header `{name}`: {reason}")]
    InvalidHeader { name: String, reason: String },
    #[error("Request rejected before sending: {0}")]
    Rejected(String),
}

/// Environment edits refused by the active collision policy.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnvironmentError {
    #[error("variable `{0}` already exists")]
    KeyExists(String),
    #[error("variable name must not be empty")]
    EmptyKey,
}
