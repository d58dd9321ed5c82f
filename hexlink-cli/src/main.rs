//! HEXLINK CLI - Command-line interface
//!
//! Commands:
//! - serve: Run the matchmaking server
//! - play: Launch headless bot players against a server

mod play;
mod server;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hexlink")]
#[command(about = "HEXLINK two-player connection game")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the matchmaking server
    Serve(server::ServerArgs),
    /// Launch bot players that connect and play
    Play(play::PlayArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => server::run(args),
        Commands::Play(args) => play::run(args),
    }
}
