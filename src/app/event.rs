//! Player events (player -> front end)
//!
//! Everything a front end needs to render is pushed as a `PlayerEvent`.
//! The player never blocks on the front end: the channel is unbounded and a
//! dropped receiver is ignored.

use tokio::sync::mpsc;

use crate::api::Track;
use crate::features::lyrics::{LyricLine, LyricsStatus};
use crate::features::{RepeatMode, SortOrder};

/// Notifications for the front end
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// A new playlist replaced the old one
    PlaylistLoaded {
        name: Option<String>,
        len: usize,
    },
    /// The current track changed
    TrackChanged {
        index: usize,
        track: Track,
    },
    /// Lyric panel status, with the parsed lines once ready
    LyricsStatus {
        status: LyricsStatus,
        lines: Vec<LyricLine>,
    },
    /// Highlight moved between lyric lines
    HighlightChanged {
        previous: Option<usize>,
        current: usize,
    },
    /// Bring a lyric line into view
    ScrollToLine(usize),
    /// Show or hide the jump-to-current button
    JumpButton(bool),
    /// Playback position in seconds
    Position {
        position: f64,
        duration: Option<f64>,
    },
    /// Play/pause state changed
    PlaybackState {
        playing: bool,
    },
    ShuffleChanged(bool),
    RepeatChanged(RepeatMode),
    VolumeChanged {
        volume: f32,
        muted: bool,
    },
    /// Search replaced the playlist
    SearchResults {
        query: String,
        count: usize,
    },
    SearchHistory(Vec<String>),
    /// Browse list after filtering and sorting
    BrowseList {
        tags: Vec<String>,
        active_tag: Option<String>,
        sort: SortOrder,
        songs: Vec<Track>,
    },
    /// User-visible error message
    Error(String),
}

pub type EventSender = mpsc::UnboundedSender<PlayerEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<PlayerEvent>;

/// Create the player event channel
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
