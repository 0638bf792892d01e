//! CLI configuration, a thin wrapper around `hrsync_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--api-url, --token, --timeout, --export-dir).

use std::time::Duration;

use secrecy::SecretString;

use hrsync_api::normalize_base_url;
use hrsync_core::ConsoleConfig;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

pub use hrsync_config::{
    Preferences, config_path, load_preferences_or_default, load_token, save_preferences,
};

/// Translate preferences + global flags into a `ConsoleConfig`.
///
/// Flag overrides take priority over saved preferences.
pub fn resolve_console_config(
    prefs: &Preferences,
    global: &GlobalOpts,
) -> Result<ConsoleConfig, CliError> {
    let mut config = prefs.console_config();

    if let Some(raw) = global.api_url.as_deref() {
        let url = normalize_base_url(raw).map_err(|e| CliError::Validation {
            field: "api-url".into(),
            reason: e.to_string(),
        })?;
        config.base_url = url.into();
    }
    if let Some(secs) = global.timeout {
        config.timeout = Duration::from_secs(secs);
    }
    if let Some(dir) = &global.export_dir {
        config.export_dir.clone_from(dir);
    }
    Ok(config)
}

/// Resolve the bearer token: flag or `HRSYNC_TOKEN`, then the keyring.
pub fn resolve_token(global: &GlobalOpts) -> Result<SecretString, CliError> {
    global
        .token
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .map(|t| SecretString::from(t.to_owned()))
        .or_else(load_token)
        .ok_or(CliError::NoToken)
}

/// Output format: flag, then the saved preference, then `table`.
pub fn resolve_output(prefs: &Preferences, global: &GlobalOpts) -> OutputFormat {
    use clap::ValueEnum;

    global.output.unwrap_or_else(|| {
        OutputFormat::from_str(&prefs.output, true).unwrap_or(OutputFormat::Table)
    })
}
