//! Error taxonomy for calls to the mood backend.

use thiserror::Error;

/// Why a backend call did not produce a usable response.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request did not complete within the configured timeout.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The server could not be reached at all.
    #[error("cannot connect to mood server at {0}. Is it running?")]
    Connect(String),

    /// Any other transport-level failure.
    #[error("failed to send request: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("mood server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The body of a successful response could not be decoded.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// A successful response carrying an `error` field.
    #[error("mood server reported an error: {0}")]
    Server(String),
}

impl ClientError {
    /// Whether the failure happened before any response was received.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ClientError::Timeout(_) | ClientError::Connect(_) | ClientError::Transport(_)
        )
    }
}
