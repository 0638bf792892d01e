//! Config subcommand handlers. None of these sign in.

use std::fmt::Write as _;
use std::sync::Arc;

use secrecy::SecretString;

use hrsync_config::{Preferences, clear_token, set_api_base_url, store_token};
use hrsync_core::Console;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;
use crate::sink::CliSink;

/// Format preferences for display; the token is only reported as present.
fn format_preferences(prefs: &Preferences, token_set: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "api_base_url = \"{}\"", prefs.resolved_base_url());
    let _ = writeln!(out, "timeout = {}", prefs.timeout);
    let _ = writeln!(out, "health_timeout = {}", prefs.health_timeout);
    if let Some(dir) = &prefs.export_dir {
        let _ = writeln!(out, "export_dir = \"{}\"", dir.display());
    }
    let _ = writeln!(out, "output = \"{}\"", prefs.output);
    let _ = write!(out, "token = {}", if token_set { "\"****\"" } else { "(not set)" });
    out
}

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

pub async fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut prefs = config::load_preferences_or_default();

    match args.command {
        ConfigCommand::Show => {
            let token_set = global.token.is_some() || config::load_token().is_some();
            output::print_output(&format_preferences(&prefs, token_set), global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::SetUrl { url, no_test } => {
            let accepted = if no_test {
                set_api_base_url(&mut prefs, &url)?
            } else {
                let console_config = config::resolve_console_config(&prefs, global)?;
                let console = Console::new(console_config, Arc::new(CliSink::new()))?;
                let change = console.set_api_base_url(&url).await?;
                set_api_base_url(&mut prefs, change.url.as_str())?
            };
            let path = config::save_preferences(&prefs)?;
            output::print_status(
                &format!("API address set to {} ({})", prefs.api_base_url, path.display()),
                global.quiet,
            );
            tracing::debug!(url = %accepted, "preference saved");
            Ok(())
        }

        ConfigCommand::ResetUrl => {
            let console = Console::new(prefs.console_config(), Arc::new(CliSink::new()))?;
            let url = console.reset_api_base_url()?;
            set_api_base_url(&mut prefs, url.as_str())?;
            config::save_preferences(&prefs)?;
            output::print_status(
                &format!("API address reset to {}", prefs.api_base_url),
                global.quiet,
            );
            Ok(())
        }

        ConfigCommand::SetToken { value } => {
            let raw = match value {
                Some(v) => v,
                None => rpassword::prompt_password("Access token: ").map_err(prompt_err)?,
            };
            if raw.trim().is_empty() {
                return Err(CliError::Validation {
                    field: "token".into(),
                    reason: "the token cannot be empty".into(),
                });
            }
            store_token(&SecretString::from(raw.trim().to_owned()))?;
            output::print_status("Token stored in the system keyring", global.quiet);
            Ok(())
        }

        ConfigCommand::ClearToken => {
            clear_token()?;
            output::print_status("Stored token removed", global.quiet);
            Ok(())
        }
    }
}
