//! Shared helpers for command handlers.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::CliError;

/// Parse a `--data` argument: inline JSON, or `@path` to a JSON file.
pub fn parse_payload<T: DeserializeOwned>(data: &str) -> Result<T, CliError> {
    let contents = match data.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(Path::new(path))?,
        None => data.to_owned(),
    };
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "data".into(),
        reason: format!("invalid JSON: {e}"),
    })
}
