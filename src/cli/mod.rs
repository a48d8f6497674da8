//! Command-line interface.
//!
//! Flags shared by every command live in [`GlobalArgs`]. Every flag is
//! optional at the clap level so that an absent flag, which falls back to
//! the profile or default, stays distinct from a flag given an empty value.

pub mod commands;
pub mod printer;

use crate::core::config::{ConfigOverrides, GlobalFlags, OutputFormat, Profile};
use crate::core::error::{ConfigError, CtlError, CtlResult};
use crate::core::time::parse_duration;
use clap::{Args, Parser, Subcommand};
use commands::CommandContext;
use printer::printer_for;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::time::Duration;

/// latticectl - command-line client for Lattice key-value clusters.
#[derive(Parser, Debug)]
#[command(name = "latticectl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags accepted by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Cluster endpoints, comma separated [default: 127.0.0.1:6379].
    #[arg(long, global = true, value_delimiter = ',')]
    pub endpoints: Option<Vec<String>>,

    /// Dial timeout per endpoint, e.g. 500ms, 2s [default: 2s].
    #[arg(long, global = true, value_parser = parse_duration)]
    pub dial_timeout: Option<Duration>,

    /// Client TLS certificate file.
    #[arg(long, global = true)]
    pub cert: Option<String>,

    /// Client TLS key file.
    #[arg(long = "key", id = "tls_key", global = true)]
    pub key: Option<String>,

    /// CA bundle used to verify servers.
    #[arg(long, global = true)]
    pub cacert: Option<String>,

    /// Output format [default: simple].
    #[arg(short = 'w', long, global = true, value_enum)]
    pub write_out: Option<OutputFormat>,

    /// Print keys and values as hex.
    #[arg(long, global = true)]
    pub hex: bool,

    /// Profile file with connection defaults.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

impl GlobalArgs {
    /// Values given explicitly on the command line.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            endpoints: self.endpoints.clone(),
            dial_timeout: self.dial_timeout,
            cert: self.cert.clone(),
            key: self.key.clone(),
            cacert: self.cacert.clone(),
            write_out: self.write_out,
            hex: self.hex,
        }
    }

    /// Merge these flags with the profile file, if one was named.
    pub fn global_flags(&self) -> Result<GlobalFlags, ConfigError> {
        let profile = match self.config {
            Some(ref path) => Some(Profile::from_file(path)?),
            None => None,
        };
        GlobalFlags::resolve(&self.overrides(), profile.as_ref())
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store a value under a key.
    Put(commands::PutArgs),
    /// Read the value of a key.
    Get(commands::GetArgs),
    /// Delete a key.
    Del(commands::DelArgs),
    /// Endpoint operations.
    Endpoint(commands::EndpointArgs),
}

impl From<clap::Error> for CtlError {
    fn from(err: clap::Error) -> Self {
        CtlError::Usage {
            message: err.to_string(),
        }
    }
}

/// Resolve global flags and run one command.
///
/// Stdin and the output writer are passed in so callers control both.
pub async fn run<'a>(cli: Cli, stdin: &'a mut dyn Read, out: &'a mut dyn Write) -> CtlResult<()> {
    let flags = cli.global.global_flags()?;
    let printer = printer_for(flags.output_format, flags.is_hex);

    let mut ctx = CommandContext {
        flags,
        printer,
        stdin,
        out,
    };
    let result = commands::dispatch(cli.command, &mut ctx).await;
    ctx.out.flush()?;
    result
}

/// Install the tracing subscriber.
///
/// `RUST_LOG` wins over `--log-level`. Output goes to stderr.
#[cfg(feature = "telemetry")]
pub fn init_tracing(log_level: Option<&str>) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.unwrap_or("warn")));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

#[cfg(not(feature = "telemetry"))]
pub fn init_tracing(_log_level: Option<&str>) {}
