//! Endpoint command implementation.

use super::CommandContext;
use crate::cli::printer::EndpointHealth;
use crate::client::KvClient;
use crate::core::error::{CtlError, CtlResult};
use crate::net::dial::Dialer;
use clap::{Args, Subcommand};
use std::time::Instant;

/// Endpoint operations.
#[derive(Args, Debug)]
pub struct EndpointArgs {
    #[command(subcommand)]
    pub command: EndpointCommand,
}

/// Endpoint subcommands.
#[derive(Subcommand, Debug)]
pub enum EndpointCommand {
    /// Dial every endpoint and check it answers PING.
    Health,
    /// Print the resolved connection configuration without dialing.
    Config,
}

/// Run the endpoint command.
pub async fn run_endpoint(args: EndpointArgs, ctx: &mut CommandContext<'_>) -> CtlResult<()> {
    match args.command {
        EndpointCommand::Health => endpoint_health(ctx).await,
        EndpointCommand::Config => {
            let config = ctx.flags.client_config()?;
            ctx.printer.connection_config(ctx.out, &config)?;
            Ok(())
        }
    }
}

async fn endpoint_health(ctx: &mut CommandContext<'_>) -> CtlResult<()> {
    let config = ctx.flags.client_config()?;
    let dialer = Dialer::new(&config)?;

    let mut results = Vec::with_capacity(config.endpoints.len());
    for endpoint in &config.endpoints {
        let started = Instant::now();
        let outcome = match dialer.dial_endpoint(endpoint).await {
            Ok(conn) => KvClient::from_connection(conn).ping().await,
            Err(err) => Err(err),
        };

        let took = started.elapsed();
        match outcome {
            Ok(()) => results.push(EndpointHealth {
                endpoint: endpoint.clone(),
                healthy: true,
                took,
                error: None,
            }),
            Err(err) => {
                tracing::warn!(endpoint = %endpoint, error = %err, "endpoint unhealthy");
                results.push(EndpointHealth {
                    endpoint: endpoint.clone(),
                    healthy: false,
                    took,
                    error: Some(err.to_string()),
                });
            }
        }
    }

    ctx.printer.endpoint_health(ctx.out, &results)?;

    let unhealthy = results.iter().filter(|r| !r.healthy).count();
    if unhealthy > 0 {
        return Err(CtlError::UnhealthyCluster {
            unhealthy,
            total: results.len(),
        });
    }
    Ok(())
}
