//! poolctl binary entrypoint.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pool_cli::cli::Cli;
use pool_cli::commands::PoolsCommand;
use pool_cli::output::OutputFormat;
use pool_cli::store::Registry;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), pool_cli::CliError> {
    let format = OutputFormat::new(cli.format);
    let mut registry = Registry::open(&cli.registry_config()).await?;

    let result = {
        let mut stdout = io::stdout().lock();
        PoolsCommand::new(&mut registry)
            .execute(&mut stdout, &format, &cli.command)
            .await
    };

    if let Err(e) = registry.close().await {
        tracing::debug!(error = %e, "Registry did not close cleanly");
    }
    result
}
