//! Error taxonomy shared by the gateway, the favorites store and the player

use thiserror::Error;

use crate::model::TrackId;

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    /// No usable bearer token; raised before any request is attempted
    #[error("You must be signed in to continue")]
    AuthenticationRequired,

    /// Transport-level failure (connection refused, DNS, TLS, ...)
    #[error("Network failure: {0}")]
    NetworkFailure(#[from] reqwest::Error),

    /// Non-success response carrying a server message
    #[error("{message} ({status})")]
    RemoteError { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Malformed duration {0:?}, expected M:SS")]
    MalformedDuration(String),

    #[error("Track {0} is not in the catalog")]
    TrackNotFound(TrackId),

    /// A favorite toggle for this track has not settled yet
    #[error("A favorite update for track {0} is already in progress")]
    ToggleInFlight(TrackId),
}

impl ClientError {
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            401 => Self::AuthenticationRequired,
            _ => Self::RemoteError {
                status,
                message: message.into(),
            },
        }
    }

    /// Whether the failure concerns the credential rather than the request
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::AuthenticationRequired)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}
