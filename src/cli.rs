//! Command line interface

pub mod lyrics;
pub mod play;
pub mod search;
mod terminal;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use lyricdeck::api::CatalogClient;
use lyricdeck::features::Settings;

#[derive(Debug, Parser)]
#[command(name = "lyricdeck", version, about = "Music player with synced LRC lyrics")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Play the catalog, a tag, a search, a playlist file or a single track
    Play(PlayArgs),
    /// Print the timed lines of an LRC file
    Lyrics(LyricsArgs),
    /// Search the catalog and list the results
    Search(SearchArgs),
}

/// Catalog API options shared by the networked commands
#[derive(Debug, Clone, Args)]
pub struct ApiArgs {
    /// Catalog API base URL (overrides settings.json)
    #[arg(long, value_name = "URL")]
    pub api: Option<String>,
}

impl ApiArgs {
    /// Settings with command line overrides applied
    pub fn settings(&self) -> Settings {
        let mut settings = Settings::load();
        if let Some(base_url) = &self.api {
            settings.api.base_url = base_url.clone();
        }
        settings
    }
}

#[derive(Debug, Args)]
pub struct PlayArgs {
    /// Play the catalog entries with this tag
    #[arg(long, conflicts_with_all = ["search", "playlist", "title"])]
    pub tag: Option<String>,

    /// Play the results of a catalog search
    #[arg(long, conflicts_with_all = ["playlist", "title"])]
    pub search: Option<String>,

    /// Play a local JSON playlist file ({ "name": ..., "songs": [...] })
    #[arg(long, value_name = "FILE", conflicts_with = "title")]
    pub playlist: Option<PathBuf>,

    /// Title of a single track to play
    #[arg(long, requires = "url")]
    pub title: Option<String>,

    /// Media URL of the single track
    #[arg(long, requires = "title")]
    pub url: Option<String>,

    /// Artist of the single track
    #[arg(long, requires = "title")]
    pub artist: Option<String>,

    /// Lyric URL of the single track
    #[arg(long, requires = "title")]
    pub lrc: Option<String>,

    /// Start in shuffle mode
    #[arg(long)]
    pub shuffle: bool,

    /// Length of every simulated track in seconds
    #[arg(long, value_name = "SECS", default_value_t = 180)]
    pub track_length: u64,

    /// Keep player state in memory only
    #[arg(long)]
    pub no_persist: bool,

    /// Player state file (overrides settings.json)
    #[arg(long, value_name = "FILE")]
    pub state_file: Option<PathBuf>,

    #[command(flatten)]
    pub api: ApiArgs,
}

#[derive(Debug, Args)]
pub struct LyricsArgs {
    /// LRC file to parse
    pub file: PathBuf,

    /// Mark the line highlighted at this position (seconds)
    #[arg(long, value_name = "SECS")]
    pub at: Option<f64>,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Search term
    pub query: String,

    #[command(flatten)]
    pub api: ApiArgs,
}

/// HTTP client for the configured catalog
pub fn catalog_client(settings: &Settings) -> anyhow::Result<Arc<CatalogClient>> {
    let client = CatalogClient::new(&settings.api.base_url, settings.api.request_timeout())
        .with_context(|| format!("Invalid catalog API at {}", settings.api.base_url))?;
    Ok(Arc::new(client))
}
