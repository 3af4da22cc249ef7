//! calfeed CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use calfeed_client::cli::{Cli, Command, ConfigAction};
use calfeed_client::commands;
use calfeed_client::config::ClientConfig;
use calfeed_client::error::ClientResult;
use calfeed_core::init_tracing;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config = match cli.config {
        Some(ref path) => ClientConfig::load_from(path)?,
        None => ClientConfig::load()?,
    };

    let tracing = config.log.to_tracing_config(cli.debug, cli.log_format)?;
    if let Err(e) = init_tracing(tracing) {
        eprintln!("warning: {}", e);
    }

    match cli.command {
        Command::Parse(args) => commands::parse::run(&args, &config).await,
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(),
        },
    }
}
