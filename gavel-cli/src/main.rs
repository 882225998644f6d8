use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod discord;
mod paths;

#[derive(Parser)]
#[command(name = "gavel", about = "Live timed player auctions for Discord")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to Discord and serve auctions
    Run(commands::run::RunArgs),
    /// Drive an auction from stdin without Discord
    Console(commands::console::ConsoleArgs),
    /// Inspect and edit teams and players
    Roster(commands::roster::RosterArgs),
    /// Manage configuration
    Config(commands::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Run(args) => commands::run::run(args).await,
        Commands::Console(args) => commands::console::run(args).await,
        Commands::Roster(args) => commands::roster::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
