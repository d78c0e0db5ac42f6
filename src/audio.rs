//! Media element abstraction
//!
//! The player drives three media slots: the one that is playing and two
//! silent lookahead slots holding the previous and next tracks. Promoting a
//! lookahead slot makes it current without fetching anything again.
//!
//! - `MediaBackend`: non-blocking control surface a front end implements
//! - `SimulatedBackend`: wall-clock backend used by the terminal front end

mod simulated;

pub use simulated::SimulatedBackend;

/// One of the three media elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Audible element
    Current,
    /// Lookahead for the next track
    Next,
    /// Lookahead for the previous track
    Prev,
}

/// Buffering progress, ordered like the HTML media `readyState`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ReadyState {
    #[default]
    HaveNothing,
    HaveMetadata,
    HaveCurrentData,
    HaveFutureData,
    HaveEnoughData,
}

impl ReadyState {
    /// Enough data to start playback of a promoted slot
    pub fn can_play(self) -> bool {
        self >= ReadyState::HaveCurrentData
    }
}

/// Something the current media element reported
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Playback position in seconds
    TimeUpdate(f64),
    /// Reached the end of the track
    Ended,
    /// Loading or decoding failed
    Error(String),
}

/// Non-blocking media control
///
/// All methods return immediately; progress is observed through
/// `ready_state`, `position` and `poll_events`.
pub trait MediaBackend: Send {
    /// Start loading `url` into `slot` without playing it
    fn load(&mut self, slot: Slot, url: &str);

    /// Unload `slot`
    fn clear(&mut self, slot: Slot);

    /// URL currently assigned to `slot`
    fn source(&self, slot: Slot) -> Option<String>;

    fn ready_state(&self, slot: Slot) -> ReadyState;

    /// Make a lookahead slot current. The lookahead slot is left empty.
    /// Returns false when the slot has nothing loaded.
    fn promote(&mut self, slot: Slot) -> bool;

    fn play(&mut self);

    fn pause(&mut self);

    fn is_paused(&self) -> bool;

    /// Seek the current element (seconds)
    fn seek(&mut self, position: f64);

    /// Position of the current element (seconds)
    fn position(&self) -> f64;

    /// Duration of the current element, when known
    fn duration(&self) -> Option<f64>;

    /// Applied to every slot so promoted tracks keep the level
    fn set_volume(&mut self, volume: f32);

    /// Drain events produced since the last call
    fn poll_events(&mut self) -> Vec<MediaEvent> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_threshold() {
        assert!(!ReadyState::HaveNothing.can_play());
        assert!(!ReadyState::HaveMetadata.can_play());
        assert!(ReadyState::HaveCurrentData.can_play());
        assert!(ReadyState::HaveEnoughData.can_play());
    }
}
