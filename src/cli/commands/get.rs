//! Get command implementation.

use super::CommandContext;
use crate::client::KvClient;
use crate::core::error::CtlResult;
use clap::Args;

/// Read the value of a key.
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Key to read.
    pub key: String,
}

/// Run the get command.
pub async fn run_get(args: GetArgs, ctx: &mut CommandContext<'_>) -> CtlResult<()> {
    let config = ctx.flags.client_config()?;
    let mut client = KvClient::connect(&config).await?;
    let value = client.get(args.key.as_bytes()).await?;

    ctx.printer
        .get(ctx.out, args.key.as_bytes(), value.as_deref())?;
    Ok(())
}
