//! Player state definitions

use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::api::{Services, Track};
use crate::audio::{MediaBackend, Slot};
use crate::features::lyrics::LyricsView;
use crate::features::settings::{LyricsSettings, PlaybackSettings};
use crate::features::{BrowseState, PersistedState, RepeatMode, Settings, StateStore};

use super::event::{EventSender, PlayerEvent};
use super::update::preload_manager::{PreloadManager, SlotState};
use super::update::queue_navigator::PlaybackSelection;
use super::update::retry_guard::RetryGuard;

/// Tunables the player reads at runtime
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    pub lyrics: LyricsSettings,
    pub playback: PlaybackSettings,
    pub probe_timeout: Duration,
}

impl PlayerConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            lyrics: settings.lyrics.clone(),
            playback: settings.playback.clone(),
            probe_timeout: settings.api.probe_timeout(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Main player state
pub struct Player {
    /// Collaborators and configuration
    pub(crate) core: CoreState,
    /// Playlist and where it came from
    pub(crate) library: LibraryState,
    /// Selection, transport and lookahead
    pub(crate) playback: PlaybackState,
    /// Lyric panel and in-flight lyric request
    pub(crate) lyrics: LyricsState,
}

/// Collaborators and configuration
pub struct CoreState {
    pub config: PlayerConfig,
    pub services: Services,
    pub media: Box<dyn MediaBackend>,
    pub store: Arc<dyn StateStore>,
    pub events: EventSender,
    pub rng: StdRng,
}

/// Playlist and where it came from
#[derive(Debug, Default)]
pub struct LibraryState {
    pub playlist: Vec<Track>,
    pub playlist_name: Option<String>,
    /// Bumped on every playlist request; only the latest result is applied
    pub playlist_request: u64,
    pub active_tag: Option<String>,
    pub active_search: Option<String>,
    pub search_history: Vec<String>,
    pub browse: BrowseState,
    /// Saved position to restore on the first catalog load
    pub restore: Option<RestorePoint>,
}

/// Saved playback position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestorePoint {
    pub index: usize,
    pub position: f64,
    pub playing: bool,
}

/// Selection, transport and lookahead
#[derive(Debug)]
pub struct PlaybackState {
    pub selection: PlaybackSelection,
    /// The current slot holds `selection.current_index`
    pub loaded: bool,
    /// Play intent, independent of what the media element reports
    pub playing: bool,
    pub volume: f32,
    /// Volume to restore when unmuting
    pub last_volume: f32,
    pub repeat: RepeatMode,
    pub preload: PreloadManager,
    pub retry: RetryGuard,
    /// Tracks abandoned in a row without any playback progress
    pub abandoned: usize,
}

/// Lyric panel and in-flight lyric request
#[derive(Debug, Default)]
pub struct LyricsState {
    pub view: LyricsView,
    /// Lyric URL of the latest request; other results are stale
    pub pending_url: Option<String>,
    /// The one link refresh for this track has been used
    pub refresh_used: bool,
}

impl Player {
    /// Create a player, restoring persisted preferences from `store`
    pub fn new(
        config: PlayerConfig,
        services: Services,
        mut media: Box<dyn MediaBackend>,
        store: Arc<dyn StateStore>,
        events: EventSender,
    ) -> Self {
        let saved = PersistedState::load(store.as_ref());
        tracing::debug!("Restored player state: {:?}", saved);

        media.set_volume(saved.volume);
        let retry = RetryGuard::new(
            config.playback.max_refresh_attempts,
            config.playback.refresh_cooldown(),
        );

        let restore = saved.current_index.map(|index| RestorePoint {
            index,
            position: saved.position_secs,
            playing: saved.playing,
        });

        Self {
            core: CoreState {
                config,
                services,
                media,
                store,
                events,
                rng: StdRng::from_os_rng(),
            },
            library: LibraryState {
                active_tag: saved.tag.clone(),
                active_search: saved.search_term.clone(),
                search_history: saved.search_history.clone(),
                browse: BrowseState::new(saved.browse_sort),
                restore,
                ..Default::default()
            },
            playback: PlaybackState {
                selection: PlaybackSelection {
                    shuffle: saved.shuffle,
                    ..Default::default()
                },
                loaded: false,
                playing: false,
                volume: saved.volume,
                last_volume: if saved.volume > 0.0 { saved.volume } else { 1.0 },
                repeat: saved.repeat,
                preload: PreloadManager::default(),
                retry,
                abandoned: 0,
            },
            lyrics: LyricsState::default(),
        }
    }

    /// Use a deterministic shuffle source
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.core.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub(crate) fn emit(&self, event: PlayerEvent) {
        // A closed receiver only means nobody is rendering
        let _ = self.core.events.send(event);
    }

    // ============ Read access for front ends ============

    pub fn playlist(&self) -> &[Track] {
        &self.library.playlist
    }

    pub fn playlist_name(&self) -> Option<&str> {
        self.library.playlist_name.as_deref()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.playback
            .loaded
            .then_some(self.playback.selection.current_index)
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current_index().and_then(|i| self.library.playlist.get(i))
    }

    pub fn selection(&self) -> &PlaybackSelection {
        &self.playback.selection
    }

    pub fn is_playing(&self) -> bool {
        self.playback.playing
    }

    pub fn is_shuffle(&self) -> bool {
        self.playback.selection.shuffle
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.playback.repeat
    }

    pub fn volume(&self) -> f32 {
        self.playback.volume
    }

    pub fn is_muted(&self) -> bool {
        self.playback.volume <= 0.0
    }

    pub fn lyrics(&self) -> &LyricsView {
        &self.lyrics.view
    }

    pub fn search_history(&self) -> &[String] {
        &self.library.search_history
    }

    pub fn browse(&self) -> &BrowseState {
        &self.library.browse
    }

    pub fn media(&self) -> &dyn MediaBackend {
        self.core.media.as_ref()
    }

    /// Lookahead slot state (for debugging/UI)
    pub fn preload_state(&self, slot: Slot) -> Option<SlotState> {
        self.playback.preload.state(slot)
    }

    pub fn position_poll_interval(&self) -> Duration {
        self.core.config.playback.position_poll()
    }

    pub fn save_interval(&self) -> Duration {
        self.core.config.playback.save_interval()
    }
}
