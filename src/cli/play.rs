//! `lyricdeck play`: run the player against the catalog with simulated media

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use lyricdeck::api::{Services, Track};
use lyricdeck::app::{Runtime, StartupRequest, event_channel};
use lyricdeck::audio::SimulatedBackend;
use lyricdeck::features::{FileStore, MemoryStore, Settings, StateStore};
use lyricdeck::{Message, Player, app::PlayerConfig};

use super::terminal::{self, KEY_HELP, RawMode, Renderer};
use super::{PlayArgs, catalog_client};

fn startup_request(args: &PlayArgs) -> StartupRequest {
    let single = match (&args.title, &args.url) {
        (Some(title), Some(url)) => Some(Track::single(
            title,
            url,
            args.artist.as_deref(),
            args.lrc.as_deref(),
        )),
        _ => None,
    };
    StartupRequest {
        search: args.search.clone(),
        tag: args.tag.clone(),
        single,
        playlist_file: args.playlist.clone(),
        shuffle: args.shuffle,
    }
}

fn open_store(args: &PlayArgs, settings: &Settings) -> anyhow::Result<Arc<dyn StateStore>> {
    if args.no_persist {
        return Ok(Arc::new(MemoryStore::new()));
    }
    let path = args
        .state_file
        .clone()
        .or_else(|| settings.state_file_path())
        .context("No data directory for the state file, pass --state-file or --no-persist")?;
    tracing::debug!("Player state file: {}", path.display());
    Ok(Arc::new(FileStore::open(path)))
}

pub async fn run(args: PlayArgs) -> anyhow::Result<()> {
    let settings = args.api.settings();
    let client = catalog_client(&settings)?;
    let store = open_store(&args, &settings)?;

    let media = SimulatedBackend::new(Duration::from_secs(args.track_length));
    let (events_tx, mut events_rx) = event_channel();
    let player = Player::new(
        PlayerConfig::from_settings(&settings),
        Services::from_client(client),
        Box::new(media),
        store,
        events_tx,
    );
    let (runtime, commands) = Runtime::new(player);

    tracing::info!("Using catalog at {}", settings.api.base_url);
    terminal::print_line(KEY_HELP);

    let _raw = RawMode::enable().context("Failed to switch the terminal to raw mode")?;
    let keys = terminal::spawn_key_reader(commands.clone());

    let render = tokio::spawn(async move {
        let mut renderer = Renderer::default();
        while let Some(event) = events_rx.recv().await {
            if let Some(line) = renderer.describe(event) {
                terminal::print_line(&line);
            }
        }
    });

    let player = runtime.run(Message::Startup(startup_request(&args))).await;
    // Closing the command channel stops the key reader
    drop(commands);
    tracing::debug!(
        "Stopped at {:?} of {} tracks",
        player.current_index(),
        player.playlist().len()
    );
    drop(player);

    if keys.join().is_err() {
        tracing::warn!("Key reader panicked");
    }
    render.await.context("Renderer task failed")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command};
    use clap::Parser;

    fn play_args(argv: &[&str]) -> PlayArgs {
        let mut full = vec!["lyricdeck", "play"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Command::Play(args) => args,
            _ => panic!("expected play"),
        }
    }

    #[test]
    fn test_startup_request_single_track() {
        let args = play_args(&["--title", "Song", "--url", "https://x/a.mp3", "--artist", "Band"]);
        let request = startup_request(&args);
        let single = request.single.unwrap();
        assert_eq!(single.title, "Song");
        assert_eq!(single.artist.as_deref(), Some("Band"));
        assert!(request.search.is_none());
    }

    #[test]
    fn test_startup_request_search_with_shuffle() {
        let args = play_args(&["--search", "blue", "--shuffle"]);
        let request = startup_request(&args);
        assert_eq!(request.search.as_deref(), Some("blue"));
        assert!(request.shuffle);
        assert!(request.single.is_none());
    }

    #[test]
    fn test_store_selection() {
        let settings = Settings::default();
        let args = play_args(&["--no-persist"]);
        let store = open_store(&args, &settings).unwrap();
        assert!(store.get("volume").is_none());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let arg = path.to_string_lossy().to_string();
        let args = play_args(&["--state-file", &arg]);
        let store = open_store(&args, &settings).unwrap();
        store.set("volume", "0.5".to_string()).unwrap();
        assert!(path.exists());
    }
}
