// ── Core error types ──
//
// What callers of the synchronization core see. Transport failures are
// flattened into `Transport` with the extracted server message; schema
// violations keep the full `DecodeFailure`.

use thiserror::Error;

use crate::decode::DecodeFailure;
use crate::model::{Capability, EntityKind};

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Payload errors ───────────────────────────────────────────────
    #[error("{0}")]
    Decode(DecodeFailure),

    // ── Remote errors ────────────────────────────────────────────────
    #[error("Request failed: {message}")]
    Transport {
        message: String,
        /// HTTP status code, if the server answered.
        status: Option<u16>,
    },

    #[error("Access token rejected -- sign in again")]
    Unauthorized,

    #[error("{} unavailable", .capability.label())]
    Unavailable { capability: Capability },

    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: i64 },

    // ── Session / configuration ──────────────────────────────────────
    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Local ────────────────────────────────────────────────────────
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// The reason shown to the user in failure notifications.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport { message, .. } | Self::Config { message } => message.clone(),
            Self::Decode(failure) => format!("unexpected response from the server ({})", failure.context),
            other => other.to_string(),
        }
    }

    /// HTTP status code, when the error came from a server answer.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            Self::Unauthorized => Some(401),
            Self::NotFound { .. } => Some(404),
            _ => None,
        }
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

impl From<DecodeFailure> for CoreError {
    fn from(failure: DecodeFailure) -> Self {
        Self::Decode(failure)
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<hrsync_api::Error> for CoreError {
    fn from(err: hrsync_api::Error) -> Self {
        match err {
            hrsync_api::Error::Unauthorized => Self::Unauthorized,
            hrsync_api::Error::Http {
                status, message, ..
            } => Self::Transport {
                message,
                status: Some(status),
            },
            hrsync_api::Error::Transport(ref e) => Self::Transport {
                message: if e.is_connect() {
                    "the HR service could not be reached".into()
                } else if e.is_timeout() {
                    "the request timed out".into()
                } else {
                    e.to_string()
                },
                status: e.status().map(|s| s.as_u16()),
            },
            hrsync_api::Error::InvalidUrl(e) => Self::Config {
                message: format!("Invalid URL: {e}"),
            },
            hrsync_api::Error::InvalidBaseUrl { reason } => Self::Config { message: reason },
            hrsync_api::Error::Io(e) => Self::Io(e),
            other @ (hrsync_api::Error::Timeout { .. } | hrsync_api::Error::Unhealthy { .. }) => {
                Self::Transport {
                    status: other.status(),
                    message: other.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_keeps_server_message() {
        let err = CoreError::from(hrsync_api::Error::Http {
            status: 409,
            message: "code already used".into(),
            code: None,
        });
        assert_eq!(err.user_message(), "code already used");
        assert_eq!(err.status(), Some(409));
    }

    #[test]
    fn unhealthy_maps_to_transport() {
        let err = CoreError::from(hrsync_api::Error::Unhealthy { status: 503 });
        assert!(matches!(err, CoreError::Transport { status: Some(503), .. }));
    }

    #[test]
    fn unavailable_names_capability() {
        let err = CoreError::Unavailable {
            capability: Capability::FileTransfer,
        };
        assert_eq!(err.to_string(), "File import/export unavailable");
    }
}
