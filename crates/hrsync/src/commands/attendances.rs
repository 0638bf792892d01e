//! Attendance command handlers.

use tabled::Tabled;

use hrsync_core::Attendance;

use crate::cli::{AttendancesArgs, AttendancesCommand};
use crate::error::CliError;
use crate::output;

use super::{Ctx, records};

#[derive(Tabled)]
struct AttendanceRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Employee")]
    employee: String,
    #[tabled(rename = "In")]
    clock_in: String,
    #[tabled(rename = "Out")]
    clock_out: String,
    #[tabled(rename = "Break")]
    break_duration: String,
    #[tabled(rename = "Worked")]
    worked: String,
    #[tabled(rename = "Overtime")]
    overtime: String,
}

fn row(a: &Attendance) -> AttendanceRow {
    AttendanceRow {
        id: a.id,
        date: a.date.display_date(),
        employee: format!("{} (#{})", a.employee_name, a.employee_id),
        clock_in: a.clock_in.clone(),
        clock_out: a.clock_out.clone(),
        break_duration: a.break_duration.clone(),
        worked: format!("{:.2}", a.worked_hours),
        overtime: format!("{:.2}", a.overtime_hours),
    }
}

pub async fn handle(ctx: &Ctx, args: AttendancesArgs) -> Result<(), CliError> {
    let store = ctx.console.attendances();
    let found = match args.command {
        AttendancesCommand::Record(cmd) => {
            return records::handle(ctx, store, cmd, row).await;
        }
        AttendancesCommand::ByEmployee {
            employee_id,
            date: Some(date),
        } => store.by_employee_and_date(employee_id, date).await?,
        AttendancesCommand::ByEmployee {
            employee_id,
            date: None,
        } => store.by_employee(employee_id).await?,
        AttendancesCommand::Range { start, end } => {
            if end < start {
                return Err(CliError::Validation {
                    field: "range".into(),
                    reason: format!("end {end} is before start {start}"),
                });
            }
            store.by_date_range(start, end).await?
        }
    };

    let out = output::render_list(ctx.output, &found, row, |a| a.id.to_string())?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}
