// ABOUTME: Error taxonomy for the remote log service client.
// ABOUTME: Distinguishes auth, API, transport, and malformed-response failures.

use thiserror::Error;

/// Failures observable from a service call. The session narrates all of
/// these identically as an in-character assistant entry, but library
/// callers can still tell them apart.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The credential was missing, expired, or rejected (401/403).
    #[error("authentication rejected by the service")]
    Auth,

    /// The service answered with a non-success status.
    #[error("service error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The network call itself failed.
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered 2xx but the body was not the expected shape.
    #[error("malformed service response: {0}")]
    InvalidResponse(String),
}

impl ServiceError {
    /// A human-readable line suitable for narrating the failure in the
    /// transcript. Deliberately vague about mechanics — errors are told
    /// in-character, not as alerts.
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth | Self::Api { .. } => {
                "Hmm, I couldn't reach my notebook just now. Could you try that again in a moment?"
                    .to_string()
            }
            Self::Transport(_) => {
                "I'm having trouble connecting right now. Please check your connection and try again."
                    .to_string()
            }
            Self::InvalidResponse(_) => {
                "Something got garbled on my end. Mind sending that one more time?".to_string()
            }
        }
    }
}
