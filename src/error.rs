use thiserror::Error;

use crate::models::ActionKind;

/// Every way a viewer action (toggle, search, delete) can fail.
///
/// Toggle failures are recovered locally: the controller restores the pre-toggle
/// snapshot before returning one of them, so callers only decide how to surface it.
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("Sign in to continue")]
    Unauthenticated,

    #[error("Cannot perform action: missing identifier")]
    MissingIdentifier,

    #[error("A {0} request for this item is already in flight")]
    InFlight(ActionKind),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Server rejected the request with status {0}")]
    Status(u16),

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Request was cancelled before it settled")]
    Cancelled,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ActionError {
    /// The sign-in prompt path, as opposed to an error toast.
    pub fn is_auth_prompt(&self) -> bool {
        matches!(self, ActionError::Unauthenticated)
    }

    /// Errors raised before any state was touched or any request was issued.
    pub fn is_rejected_before_send(&self) -> bool {
        matches!(
            self,
            ActionError::Unauthenticated
                | ActionError::MissingIdentifier
                | ActionError::InFlight(_)
        )
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable must be set")]
    Missing(&'static str),

    #[error("Invalid {key} value: {value}")]
    Invalid { key: &'static str, value: String },
}
