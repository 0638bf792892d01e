use thiserror::Error;

/// Top-level error type for the `hrsync-api` crate.
///
/// Covers every failure mode of the HR service surface: transport,
/// HTTP status errors, health probing, and local file access for
/// uploads. `hrsync-core` maps these into its own taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The configured API address could not be normalized.
    #[error("Invalid API base address: {reason}")]
    InvalidBaseUrl { reason: String },

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── HTTP ────────────────────────────────────────────────────────
    /// The bearer token was rejected (HTTP 401).
    #[error("Unauthorized -- the access token was rejected")]
    Unauthorized,

    /// Non-success status with the message extracted from the body.
    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        code: Option<String>,
    },

    /// The health endpoint answered with an error status.
    #[error("Health check failed with HTTP {status}")]
    Unhealthy { status: u16 },

    // ── Local ───────────────────────────────────────────────────────
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } | Self::Unhealthy { .. } => true,
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Http { status: 404, .. } => true,
            _ => false,
        }
    }

    /// HTTP status code, if the failure carried one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Http { status, .. } | Self::Unhealthy { status } => Some(*status),
            Self::Unauthorized => Some(401),
            _ => None,
        }
    }
}
