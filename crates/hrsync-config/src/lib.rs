//! Persisted preferences for the HR console.
//!
//! A TOML preferences file in the platform config directory (overridable
//! through `HRSYNC_*` environment variables), bearer-token storage in the
//! OS keyring, and translation to `hrsync_core::ConsoleConfig`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use hrsync_api::base_url::display_base_url;
use hrsync_api::{DEFAULT_API_BASE_URL, normalize_base_url};
use hrsync_core::ConsoleConfig;

const KEYRING_SERVICE: &str = "hrsync";
const KEYRING_ACCOUNT: &str = "access-token";

/// Environment variable consulted before the keyring.
pub const TOKEN_ENV: &str = "HRSYNC_TOKEN";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize preferences: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("preferences loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("credential store error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Preferences ─────────────────────────────────────────────────────

/// Everything the console remembers between runs, except the token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Preferences {
    /// API base address as last accepted.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Health probe timeout in seconds.
    #[serde(default = "default_health_timeout")]
    pub health_timeout: u64,

    /// Where exported spreadsheets are written.
    pub export_dir: Option<PathBuf>,

    /// Default output format for the CLI.
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            timeout: default_timeout(),
            health_timeout: default_health_timeout(),
            export_dir: None,
            output: default_output(),
        }
    }
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.into()
}
fn default_timeout() -> u64 {
    30
}
fn default_health_timeout() -> u64 {
    5
}
fn default_output() -> String {
    "table".into()
}

impl Preferences {
    /// The stored address, normalized. A value that fails normalization
    /// is discarded in favour of the default.
    pub fn resolved_base_url(&self) -> String {
        match normalize_base_url(&self.api_base_url) {
            Ok(url) => display_base_url(&url),
            Err(e) => {
                warn!(stored = %self.api_base_url, error = %e, "ignoring invalid API address");
                DEFAULT_API_BASE_URL.to_owned()
            }
        }
    }

    /// Build the runtime configuration for the core.
    pub fn console_config(&self) -> ConsoleConfig {
        ConsoleConfig {
            base_url: self.resolved_base_url(),
            timeout: Duration::from_secs(self.timeout),
            health_timeout: Duration::from_secs(self.health_timeout),
            export_dir: self
                .export_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

// ── Preferences file path ───────────────────────────────────────────

/// Resolve the preferences file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "hrsync", "hrsync").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("hrsync");
    p
}

// ── Loading ─────────────────────────────────────────────────────────

/// Load preferences from the canonical file + environment.
pub fn load_preferences() -> Result<Preferences, ConfigError> {
    load_preferences_from(&config_path())
}

/// Load preferences from `path` + environment. A missing file yields
/// the defaults.
pub fn load_preferences_from(path: &Path) -> Result<Preferences, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Preferences::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("HRSYNC_").only(&[
            "api_base_url",
            "timeout",
            "health_timeout",
            "export_dir",
            "output",
        ]));

    let prefs: Preferences = figment.extract()?;
    debug!(path = %path.display(), api = %prefs.api_base_url, "preferences loaded");
    Ok(prefs)
}

/// Load preferences, falling back to the defaults on any error.
pub fn load_preferences_or_default() -> Preferences {
    load_preferences().unwrap_or_else(|e| {
        warn!(error = %e, "could not load preferences, using defaults");
        Preferences::default()
    })
}

// ── Saving ──────────────────────────────────────────────────────────

/// Serialize preferences to TOML and write them to the canonical path.
pub fn save_preferences(prefs: &Preferences) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_preferences_to(prefs, &path)?;
    Ok(path)
}

pub fn save_preferences_to(prefs: &Preferences, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(prefs)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Normalize `raw` and record it as the API address.
pub fn set_api_base_url(prefs: &mut Preferences, raw: &str) -> Result<Url, ConfigError> {
    let url = normalize_base_url(raw).map_err(|e| ConfigError::Validation {
        field: "api_base_url".into(),
        reason: e.to_string(),
    })?;
    prefs.api_base_url = display_base_url(&url);
    Ok(url)
}

// ── Bearer token ────────────────────────────────────────────────────

fn token_entry() -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(KEYRING_SERVICE, KEYRING_ACCOUNT)?)
}

/// Resolve the bearer token: `HRSYNC_TOKEN` first, then the keyring.
pub fn load_token() -> Option<SecretString> {
    if let Ok(val) = std::env::var(TOKEN_ENV) {
        if !val.trim().is_empty() {
            return Some(SecretString::from(val));
        }
    }

    match token_entry().and_then(|entry| Ok(entry.get_password()?)) {
        Ok(secret) => Some(SecretString::from(secret)),
        Err(ConfigError::Keyring(keyring::Error::NoEntry)) => None,
        Err(e) => {
            debug!(error = %e, "keyring lookup failed");
            None
        }
    }
}

/// Store the bearer token in the OS keyring.
pub fn store_token(token: &SecretString) -> Result<(), ConfigError> {
    token_entry()?.set_password(token.expose_secret())?;
    Ok(())
}

/// Remove the stored bearer token. Removing an absent token succeeds.
pub fn clear_token() -> Result<(), ConfigError> {
    match token_entry()?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(e.into()),
    }
}
