//! mcapp binary entrypoint.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use mcapp_cli::cli::Cli;
use mcapp_cli::commands::dispatch;
use mcapp_cli::config::Config;
use mcapp_cli::http::RestClient;
use mcapp_cli::output::OutputFormat;
use mcapp_cli::CliError;

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

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

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = Config::resolve(&cli)?;
    let client = RestClient::new(&config)?;
    debug!(api = %client.base_url(), "using management API");

    let format = OutputFormat::new(cli.format);
    let mut stdout = io::stdout().lock();

    tokio::select! {
        result = dispatch(&client, &config, cli.command, &mut stdout, &format) => result,
        _ = tokio::signal::ctrl_c() => Err(CliError::Interrupted),
    }
}
