//! Department command handlers.

use tabled::Tabled;

use hrsync_core::Department;

use crate::cli::{DepartmentsArgs, TransferCommand, TransferableCommand};
use crate::error::CliError;
use crate::output;

use super::{Ctx, records};

#[derive(Tabled)]
struct DepartmentRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
}

fn row(d: &Department) -> DepartmentRow {
    DepartmentRow {
        id: d.id,
        code: d.code.clone(),
        name: d.name.clone(),
        description: d.description.clone(),
    }
}

pub async fn handle(ctx: &Ctx, args: DepartmentsArgs) -> Result<(), CliError> {
    match args.command {
        TransferableCommand::Record(cmd) => {
            records::handle(ctx, ctx.console.departments(), cmd, row).await
        }

        TransferableCommand::Transfer(TransferCommand::Import { path }) => {
            ctx.console.import_departments(&path).await?;
            output::print_status(
                &format!(
                    "Departments imported ({} records)",
                    ctx.console.departments().snapshot().len()
                ),
                ctx.quiet,
            );
            Ok(())
        }

        TransferableCommand::Transfer(TransferCommand::Export) => {
            let path = ctx.console.export_departments().await?;
            output::print_output(&path.display().to_string(), ctx.quiet);
            Ok(())
        }
    }
}
