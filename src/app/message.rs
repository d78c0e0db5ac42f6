//! Player messages (front end and async results -> player)

use std::path::PathBuf;

use crate::api::Track;
use crate::audio::{MediaEvent, Slot};
use crate::features::SortOrder;

/// Direction of a track change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Lookahead slot that buffers the track in this direction
    pub fn slot(self) -> Slot {
        match self {
            Direction::Forward => Slot::Next,
            Direction::Backward => Slot::Prev,
        }
    }
}

/// Where a playlist came from
#[derive(Debug, Clone, PartialEq)]
pub enum PlaylistSource {
    /// Catalog listing, optionally filtered by tag
    Catalog { tag: Option<String> },
    /// Catalog search; startup searches fall back to the full catalog
    Search { query: String, fallback: bool },
    /// Local JSON playlist file
    File(PathBuf),
    /// Explicit single track
    Single,
    /// Visible browse list
    Browse,
}

/// A fetched playlist
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedPlaylist {
    pub name: Option<String>,
    pub songs: Vec<Track>,
}

/// How the first playlist is chosen
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StartupRequest {
    pub search: Option<String>,
    pub tag: Option<String>,
    pub single: Option<Track>,
    pub playlist_file: Option<PathBuf>,
    /// Start in shuffle mode regardless of the saved flag
    pub shuffle: bool,
}

/// Player messages
#[derive(Debug, Clone)]
pub enum Message {
    /// No-op message
    Noop,

    // ============ Library ============
    /// Choose and load the first playlist
    Startup(StartupRequest),
    /// Load the catalog (optionally by tag)
    LoadCatalog { tag: Option<String> },
    /// Load a local playlist file
    LoadPlaylistFile(PathBuf),
    /// Play a single explicit track
    LoadSingle(Track),
    /// Search the catalog and play the results
    Search(String),
    /// A playlist request finished
    PlaylistFetched {
        request: u64,
        source: PlaylistSource,
        /// Restore the saved index/position/play state
        restore: bool,
        result: Result<LoadedPlaylist, String>,
    },

    // ============ Browse ============
    /// Load the catalog snapshot for browsing
    OpenBrowse,
    BrowseLoaded(Result<Vec<Track>, String>),
    BrowseSelectTag(Option<String>),
    BrowseSort(SortOrder),
    BrowseFilter(String),
    /// Play entry `i` of the visible browse list
    BrowsePlay(usize),

    // ============ Playback ============
    /// Jump to a playlist index
    PlaySong(usize),
    Play,
    Pause,
    TogglePlayPause,
    /// Seek to seconds
    Seek(f64),
    Next,
    Previous,
    ToggleShuffle,
    CycleRepeat,
    SetVolume(f32),
    /// Change volume by this many steps
    AdjustVolume(i32),
    ToggleMute,

    // ============ Media element ============
    /// Pull pending events from the media backend
    PollMedia,
    MediaTimeUpdate(f64),
    MediaEnded,
    MediaError(String),
    /// Link refresh after a playback error finished
    AudioLinkRefreshed {
        index: usize,
        key: String,
        position: f64,
        url: Option<String>,
    },

    // ============ Lookahead ============
    /// A lookahead probe/refresh finished
    PreloadResolved {
        slot: Slot,
        index: usize,
        generation: u64,
        url: Option<String>,
    },

    // ============ Lyrics ============
    LyricsFetched {
        url: String,
        result: Result<String, String>,
    },
    LyricsLinkRefreshed {
        url: String,
        replacement: Option<String>,
    },
    /// Scroll event from the lyric panel
    LyricsScrolled,
    LyricsAutoScrollSettled(u64),
    LyricsScrollIdle(u64),
    JumpToCurrentLyric,

    // ============ Persistence ============
    SaveState,
    /// Save and stop the runtime
    Quit,
}

impl From<MediaEvent> for Message {
    fn from(event: MediaEvent) -> Self {
        match event {
            MediaEvent::TimeUpdate(position) => Message::MediaTimeUpdate(position),
            MediaEvent::Ended => Message::MediaEnded,
            MediaEvent::Error(error) => Message::MediaError(error),
        }
    }
}
