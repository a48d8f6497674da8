//! Del command implementation.

use super::CommandContext;
use crate::client::KvClient;
use crate::core::error::CtlResult;
use clap::Args;

/// Delete a key.
#[derive(Args, Debug)]
pub struct DelArgs {
    /// Key to delete.
    pub key: String,
}

/// Run the del command.
pub async fn run_del(args: DelArgs, ctx: &mut CommandContext<'_>) -> CtlResult<()> {
    let config = ctx.flags.client_config()?;
    let mut client = KvClient::connect(&config).await?;
    let deleted = client.delete(args.key.as_bytes()).await?;

    ctx.printer.del(ctx.out, deleted)?;
    Ok(())
}
