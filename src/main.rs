//! `dsg` binary.
//!
//! Reads the layered configuration, sets up tracing on stderr and hands off
//! to the selected subcommand.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use dsg_core::config::{GeneratorConfig, LogFormat, LoggingConfig};

mod commands;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match GeneratorConfig::load(&cli.config, &cli.env) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("dsg: cannot load {}: {err}", cli.config);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.logging);
    tracing::debug!(path = %cli.config, env = %cli.env, "Using configuration");

    match cli.execute(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Command failed");
            eprintln!("dsg: {err}");
            ExitCode::FAILURE
        }
    }
}

/// stdout is reserved for command output.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));
    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}
