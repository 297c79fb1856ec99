//! Portman CLI - kill processes listening on TCP ports
//!
//! Interactive TUI by default; a plain listing for pipes and scripts.

mod commands;
mod tui;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "portman")]
#[command(author, version, about = "Manage processes listening on TCP ports")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Disable interactive TUI mode
    #[arg(long, global = true)]
    no_tui: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List all listening ports
    #[command(alias = "ls")]
    List,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Silent unless RUST_LOG opts in; stderr keeps the TUI screen clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::List) => {
            commands::list::run(cli.json).await?;
        }
        None => {
            if cli.no_tui || !atty::is(atty::Stream::Stdout) {
                commands::list::run(cli.json).await?;
            } else {
                tui::run().await?;
            }
        }
    }

    Ok(())
}
