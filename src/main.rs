use std::{env, io, process::ExitCode};

use clap::Parser;
use credential_guard::cli::Cli;
use tracing::{Level, subscriber};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    cli.execute().await
}

fn init_logging(verbose: u8) -> anyhow::Result<()> {
    // The runner sets RUNNER_DEBUG=1 when step debug logging is enabled
    let runner_debug = env::var("RUNNER_DEBUG").is_ok_and(|v| v == "1");

    let level = match verbose {
        0 if runner_debug => Level::DEBUG,
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // Allow RUST_LOG env var to override verbosity flag
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    // Same stream as the ::add-mask:: commands, so masks are registered
    // before any line that could carry the value
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stdout)
        .with_ansi(false)
        .with_target(verbose >= 1)
        .without_time()
        .compact()
        .finish();

    subscriber::set_global_default(subscriber)?;

    Ok(())
}
