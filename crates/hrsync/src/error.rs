//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use hrsync_config::ConfigError;
use hrsync_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the HR service: {reason}")]
    #[diagnostic(
        code(hrsync::connection_failed),
        help(
            "Check that the service is running and the API address is right.\n\
             Try: hrsync config set-url <address>"
        )
    )]
    ConnectionFailed { reason: String },

    #[error("{capability} unavailable")]
    #[diagnostic(
        code(hrsync::unavailable),
        help("Run: hrsync reconnect once the service is back")
    )]
    Unavailable { capability: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("No access token configured")]
    #[diagnostic(
        code(hrsync::no_token),
        help(
            "Store one with: hrsync config set-token\n\
             Or set the HRSYNC_TOKEN environment variable."
        )
    )]
    NoToken,

    #[error("The access token was rejected")]
    #[diagnostic(
        code(hrsync::auth_failed),
        help("Sign in again and store the new token with: hrsync config set-token")
    )]
    AuthFailed,

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} {id} not found")]
    #[diagnostic(
        code(hrsync::not_found),
        help("Run: hrsync {list_command} list to see available records")
    )]
    NotFound {
        resource_type: String,
        id: i64,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error ({status}): {message}")]
    #[diagnostic(code(hrsync::api_error))]
    ApiError { status: u16, message: String },

    #[error("Unexpected response from the server")]
    #[diagnostic(
        code(hrsync::invalid_response),
        help("{detail}\nRun with -vv to log the offending payload.")
    )]
    InvalidResponse { detail: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(hrsync::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(hrsync::config))]
    Config(#[from] ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(hrsync::json), help("Check the JSON payload and try again."))]
    Json(#[from] serde_json::Error),

    #[error("YAML rendering failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Unavailable { .. } => exit_code::CONNECTION,
            Self::NoToken | Self::AuthFailed => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. }
            | Self::Json(_)
            | Self::Config(ConfigError::Validation { .. }) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Transport {
                message,
                status: Some(status),
            } => CliError::ApiError { status, message },

            CoreError::Transport {
                message,
                status: None,
            } => CliError::ConnectionFailed { reason: message },

            CoreError::Unauthorized => CliError::AuthFailed,

            CoreError::NotAuthenticated => CliError::NoToken,

            CoreError::Unavailable { capability } => CliError::Unavailable {
                capability: capability.label().into(),
            },

            CoreError::NotFound { kind, id } => CliError::NotFound {
                resource_type: kind.schema_name().into(),
                id,
                list_command: kind.plural().into(),
            },

            // Outbound payloads are checked before they leave the process.
            CoreError::Decode(failure) if failure.context.ends_with(".payload") => {
                CliError::Validation {
                    field: "data".into(),
                    reason: failure
                        .issues
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join("; "),
                }
            }

            CoreError::Decode(failure) => CliError::InvalidResponse {
                detail: failure.to_string(),
            },

            CoreError::Config { message } => CliError::Validation {
                field: "api-url".into(),
                reason: message,
            },

            CoreError::Io(e) => CliError::Io(e),
        }
    }
}
