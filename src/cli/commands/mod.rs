//! CLI command implementations.

mod del;
mod endpoint;
mod get;
mod put;

pub use del::{run_del, DelArgs};
pub use endpoint::{run_endpoint, EndpointArgs, EndpointCommand};
pub use get::{run_get, GetArgs};
pub use put::{run_put, PutArgs};

use super::printer::Printer;
use super::Commands;
use crate::core::config::GlobalFlags;
use crate::core::error::CtlResult;
use std::io::{Read, Write};

/// Everything a command needs from its caller.
pub struct CommandContext<'a> {
    /// Resolved global flags.
    pub flags: GlobalFlags,
    /// Output renderer.
    pub printer: Box<dyn Printer>,
    /// Fallback source for positional arguments.
    pub stdin: &'a mut dyn Read,
    /// Command output.
    pub out: &'a mut dyn Write,
}

/// Run one command.
pub async fn dispatch(command: Commands, ctx: &mut CommandContext<'_>) -> CtlResult<()> {
    match command {
        Commands::Put(args) => run_put(args, ctx).await,
        Commands::Get(args) => run_get(args, ctx).await,
        Commands::Del(args) => run_del(args, ctx).await,
        Commands::Endpoint(args) => run_endpoint(args, ctx).await,
    }
}
