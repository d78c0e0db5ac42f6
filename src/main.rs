//! lyricdeck - terminal music player with synced lyrics

mod cli;

use clap::Parser;
use tracing::Level;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so they can be redirected away from the player output
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Command::Play(args) => cli::play::run(args).await,
        Command::Lyrics(args) => cli::lyrics::run(&args),
        Command::Search(args) => cli::search::run(&args).await,
    }
}
