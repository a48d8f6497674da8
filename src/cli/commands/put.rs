//! Put command implementation.

use super::CommandContext;
use crate::client::KvClient;
use crate::core::args::resolve_arg;
use crate::core::error::{ArgError, CtlResult};
use clap::Args;

/// Store a value under a key.
///
/// When VALUE is omitted it is read from stdin, e.g.
/// `cat value.txt | latticectl put greeting`.
#[derive(Args, Debug)]
pub struct PutArgs {
    /// Key and optional value.
    #[arg(required = true, num_args = 1..=2, value_names = ["KEY", "VALUE"])]
    pub args: Vec<String>,
}

/// Run the put command.
pub async fn run_put(args: PutArgs, ctx: &mut CommandContext<'_>) -> CtlResult<()> {
    let key = args.args.first().ok_or(ArgError::MissingArgument)?;
    let value = resolve_arg(&args.args, &mut *ctx.stdin, 1)?;

    let config = ctx.flags.client_config()?;
    let mut client = KvClient::connect(&config).await?;
    client.put(key.as_bytes(), value.as_bytes()).await?;
    tracing::debug!(endpoint = %client.endpoint(), key = %key, bytes = value.len(), "put");

    ctx.printer.put(ctx.out)?;
    Ok(())
}
