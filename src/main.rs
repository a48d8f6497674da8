//! latticectl - unified CLI entrypoint.
//!
//! Usage:
//!   latticectl put <key> [value]
//!   latticectl get <key>
//!   latticectl del <key>
//!   latticectl endpoint health
//!   latticectl endpoint config

use clap::Parser;
use latticectl::cli::{init_tracing, run, Cli};
use latticectl::core::error::{CtlError, ExitCodeMapping};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => exit_with_error(&CtlError::from(err)),
    };

    init_tracing(cli.global.log_level.as_deref());

    let mut stdin = std::io::stdin().lock();
    let mut stdout = std::io::stdout().lock();

    if let Err(err) = run(cli, &mut stdin, &mut stdout).await {
        exit_with_error(&err);
    }
}

fn exit_with_error(err: &CtlError) -> ! {
    match err {
        CtlError::Usage { message } => eprint!("{}", message),
        other => eprintln!("Error: {}", other),
    }
    std::process::exit(ExitCodeMapping::exit_code(err))
}
