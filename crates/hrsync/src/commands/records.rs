//! List/get/create/update/delete, shared by every record kind.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tabled::Tabled;
use tokio::task::JoinHandle;

use hrsync_core::model::{Describe, Identified};
use hrsync_core::{MutationOutcome, Resource, ResourceStore};

use crate::cli::RecordCommand;
use crate::error::CliError;
use crate::output;

use super::{Ctx, util};

pub async fn handle<R, Row>(
    ctx: &Ctx,
    store: &Arc<ResourceStore<R>>,
    cmd: RecordCommand,
    to_row: impl Fn(&R) -> Row,
) -> Result<(), CliError>
where
    R: Resource,
    R::Create: DeserializeOwned,
    R::Update: DeserializeOwned,
    Row: Tabled,
{
    match cmd {
        RecordCommand::List => {
            ctx.ensure_loaded(store.as_ref())?;
            let snap = store.snapshot();
            let out = output::render_list(
                ctx.output,
                snap.as_slice(),
                |r| to_row(r.as_ref()),
                |r| r.id().to_string(),
            )?;
            output::print_output(&out, ctx.quiet);
            Ok(())
        }

        RecordCommand::Get { id } => {
            let record = store.get_by_id(id).await?;
            print_record(ctx, &record, &to_row)
        }

        RecordCommand::Create { data } => {
            let payload: R::Create = util::parse_payload(&data)?;
            let outcome = store.create(&payload).await?;
            settle(ctx, "created", outcome, &to_row).await
        }

        RecordCommand::Update { id, data } => {
            let payload: R::Update = util::parse_payload(&data)?;
            let outcome = store.update(id, &payload).await?;
            settle(ctx, "updated", outcome, &to_row).await
        }

        RecordCommand::Delete { id } => {
            ctx.ensure_loaded(store.as_ref())?;
            let Some(outcome) = store.delete(id).await? else {
                return Err(CliError::NotFound {
                    resource_type: R::KIND.schema_name().into(),
                    id,
                    list_command: R::KIND.plural().into(),
                });
            };
            await_reload::<R>(outcome.refresh).await;
            output::print_status(
                &format!("{} {} deleted", R::KIND.schema_name(), outcome.record.describe()),
                ctx.quiet,
            );
            Ok(())
        }
    }
}

/// Print the mutated record, then wait for the follow-up reload.
async fn settle<R, Row>(
    ctx: &Ctx,
    verb: &str,
    outcome: MutationOutcome<R>,
    to_row: &impl Fn(&R) -> Row,
) -> Result<(), CliError>
where
    R: Resource,
    Row: Tabled,
{
    print_record(ctx, &outcome.record, to_row)?;
    await_reload::<R>(outcome.refresh).await;
    output::print_status(
        &format!("{} {} {verb}", R::KIND.schema_name(), outcome.record.id()),
        ctx.quiet,
    );
    Ok(())
}

/// The mutation already succeeded; a failed reload only leaves the
/// mirror stale, so it is logged rather than returned.
async fn await_reload<R: Resource>(refresh: JoinHandle<bool>) {
    match refresh.await {
        Ok(true) => {}
        Ok(false) => tracing::warn!(kind = %R::KIND, "reload after mutation did not complete"),
        Err(e) => tracing::warn!(kind = %R::KIND, error = %e, "reload task failed"),
    }
}

fn print_record<R, Row>(ctx: &Ctx, record: &R, to_row: &impl Fn(&R) -> Row) -> Result<(), CliError>
where
    R: Resource,
    Row: Tabled,
{
    let out = output::render_single(ctx.output, record, to_row, |r| r.id().to_string())?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}
