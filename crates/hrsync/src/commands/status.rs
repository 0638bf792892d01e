//! Status and reconnect handlers.

use serde::Serialize;
use tabled::Tabled;

use hrsync_api::base_url::display_base_url;
use hrsync_core::{Availability, Capability};

use crate::error::CliError;
use crate::output;

use super::Ctx;

#[derive(Serialize)]
struct CapabilityState {
    capability: Capability,
    state: Availability,
}

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "Capability")]
    capability: &'static str,
    #[tabled(rename = "State")]
    state: String,
}

fn row(c: &CapabilityState) -> StatusRow {
    StatusRow {
        capability: c.capability.label(),
        state: output::availability_label(c.state),
    }
}

fn states(ctx: &Ctx) -> Vec<CapabilityState> {
    let console = &ctx.console;
    [
        (Capability::Employees, console.employees().availability()),
        (Capability::Departments, console.departments().availability()),
        (Capability::Attendances, console.attendances().availability()),
        (Capability::FileTransfer, console.transfers().tracker().state()),
    ]
    .into_iter()
    .map(|(capability, state)| CapabilityState { capability, state })
    .collect()
}

fn print_states(ctx: &Ctx) -> Result<(), CliError> {
    output::print_status(
        &format!("API: {}", display_base_url(&ctx.console.base_url())),
        ctx.quiet,
    );
    let out = output::render_list(ctx.output, &states(ctx), row, |c| {
        format!("{}={}", c.capability, c.state)
    })?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}

/// Availability observed by the initial load.
pub fn show(ctx: &Ctx) -> Result<(), CliError> {
    print_states(ctx)
}

/// Re-probe and refresh every capability, then show the result.
pub async fn reconnect(ctx: &Ctx) -> Result<(), CliError> {
    let ok = ctx.console.reconnect_all().await;
    print_states(ctx)?;
    if ok {
        Ok(())
    } else {
        Err(CliError::ConnectionFailed {
            reason: "some capabilities are still unavailable".into(),
        })
    }
}
