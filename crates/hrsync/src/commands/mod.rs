//! Command handlers.
//!
//! Every remote command runs against a signed-in [`Console`]: the token
//! is installed, the initial parallel load settles, then the handler
//! reads the mirrors or issues its mutation.

pub mod attendances;
pub mod config_cmd;
pub mod departments;
pub mod employees;
pub mod records;
pub mod status;
pub mod util;

use std::sync::Arc;

use hrsync_core::{Console, Resource, ResourceStore};

use crate::cli::{Command, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::sink::CliSink;

/// A signed-in console plus the rendering options of this invocation.
pub struct Ctx {
    pub console: Console,
    pub sink: Arc<CliSink>,
    pub output: OutputFormat,
    pub quiet: bool,
}

impl Ctx {
    /// Build the console from preferences + flags, sign in, and wait for
    /// the initial load.
    pub async fn connect(global: &GlobalOpts) -> Result<Self, CliError> {
        let prefs = config::load_preferences_or_default();
        let console_config = config::resolve_console_config(&prefs, global)?;
        let token = config::resolve_token(global)?;

        let sink = Arc::new(CliSink::new());
        let console = Console::new(console_config, sink.clone())?;
        tracing::debug!(api = %console.base_url(), "signing in");

        if let Some(initial) = console.login(token, None) {
            let loaded = initial.await.unwrap_or(false);
            tracing::debug!(loaded, "initial load settled");
        }

        Ok(Self {
            console,
            sink,
            output: config::resolve_output(&prefs, global),
            quiet: global.quiet,
        })
    }

    /// Fail unless the mirror of `R` holds a successful load.
    pub fn ensure_loaded<R: Resource>(&self, store: &ResourceStore<R>) -> Result<(), CliError> {
        if !store.is_available() {
            return Err(CliError::Unavailable {
                capability: R::KIND.capability().label().into(),
            });
        }
        if let Some(reason) = self.sink.sync_failure(R::KIND) {
            return Err(CliError::ConnectionFailed {
                reason: format!("could not load {}: {reason}", R::KIND.plural()),
            });
        }
        Ok(())
    }
}

pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    let ctx = Ctx::connect(global).await?;
    let result = match cmd {
        Command::Employees(args) => employees::handle(&ctx, args).await,
        Command::Departments(args) => departments::handle(&ctx, args).await,
        Command::Attendances(args) => attendances::handle(&ctx, args).await,
        Command::Status => status::show(&ctx),
        Command::Reconnect => status::reconnect(&ctx).await,
        Command::Config(_) | Command::Completions(_) => Ok(()),
    };
    ctx.console.logout();
    result
}
