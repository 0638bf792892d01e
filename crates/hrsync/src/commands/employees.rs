//! Employee command handlers.

use tabled::Tabled;

use hrsync_core::Employee;

use crate::cli::{EmployeesArgs, TransferCommand, TransferableCommand};
use crate::error::CliError;
use crate::output;

use super::{Ctx, records};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct EmployeeRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Unique ID")]
    unique_id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Position")]
    position: String,
    #[tabled(rename = "Department")]
    department: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Hired")]
    hired: String,
}

fn row(e: &Employee) -> EmployeeRow {
    EmployeeRow {
        id: e.id,
        unique_id: e.unique_id.clone(),
        name: e.full_name.clone(),
        position: e.position.clone(),
        department: e.department_name.clone(),
        email: e.email.clone(),
        hired: e.hire_date.display_date(),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Ctx, args: EmployeesArgs) -> Result<(), CliError> {
    match args.command {
        TransferableCommand::Record(cmd) => {
            records::handle(ctx, ctx.console.employees(), cmd, row).await
        }

        TransferableCommand::Transfer(TransferCommand::Import { path }) => {
            ctx.console.import_employees(&path).await?;
            output::print_status(
                &format!(
                    "Employees imported ({} records)",
                    ctx.console.employees().snapshot().len()
                ),
                ctx.quiet,
            );
            Ok(())
        }

        TransferableCommand::Transfer(TransferCommand::Export) => {
            let path = ctx.console.export_employees().await?;
            output::print_output(&path.display().to_string(), ctx.quiet);
            Ok(())
        }
    }
}
