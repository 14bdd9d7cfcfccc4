//! checkpoint - update check CLI
//!
//! CLI entry point that dispatches to subcommands.

use checkpoint::cli::{Cli, Commands};
use checkpoint::error::CheckResult;
use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> CheckResult<()> {
    let cli = Cli::parse();

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("checkpoint=warn"),
        1 => EnvFilter::new("checkpoint=info"),
        _ => EnvFilter::new("checkpoint=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check(args) => checkpoint::cli::commands::check(args).await,
        Commands::Watch(args) => checkpoint::cli::commands::watch(args).await,
    }
}
