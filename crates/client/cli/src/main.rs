//! Headless client for running and inspecting puzzle levels.
//!
//! Run with: `maskgrid <command>`

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Inspect, Play};

/// Mask-swapping grid puzzle runner
#[derive(Parser)]
#[command(name = "maskgrid")]
#[command(about = "Run and inspect maskgrid levels", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Simulate a level, optionally driven by an input script
    Play(Play),

    /// Build a level and print its initial state
    Inspect(Inspect),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Play(cmd) => cmd.execute().await,
        Command::Inspect(cmd) => cmd.execute(),
    }
}
