//! Lyric synchronization state
//!
//! Tracks which line is highlighted for the current playback position and
//! who owns the scroll position. While the user is scrolling manually the
//! view stops following playback; after a quiet period (or when the user
//! presses "jump to current") ownership returns and the view re-centers.
//!
//! This type is pure state. Timers are represented by `Debouncer` tickets
//! that the caller schedules and feeds back.

use super::parser::{LyricLine, line_index_at};
use crate::utils::Debouncer;

/// What the lyric panel should show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LyricsStatus {
    /// Nothing loaded yet
    #[default]
    Idle,
    /// Track has no lyric link
    NoLyrics,
    /// Fetch in flight
    Loading,
    /// Parsed with this many lines
    Ready(usize),
    /// Fetched but nothing parseable
    ParseEmpty,
    /// Fetch failed
    LoadFailed,
}

impl LyricsStatus {
    /// Placeholder text for statuses without lines
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            LyricsStatus::Idle | LyricsStatus::Ready(_) => None,
            LyricsStatus::NoLyrics => Some("No lyrics"),
            LyricsStatus::Loading => Some("Loading lyrics..."),
            LyricsStatus::ParseEmpty => Some("Lyrics could not be parsed"),
            LyricsStatus::LoadFailed => Some("Failed to load lyrics"),
        }
    }
}

/// Highlight moved from `previous` to `current`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightChange {
    pub previous: Option<usize>,
    pub current: usize,
    /// Set when the view should scroll; the ticket ends the auto-scroll guard
    pub scroll_guard: Option<u64>,
}

/// Outcome of a scroll event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollReaction {
    /// Caused by our own auto-scroll
    Ignored,
    /// The user took over; the ticket ends the idle period
    UserControlled { idle_ticket: u64 },
}

/// Result of returning control to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recenter {
    /// Line to scroll to, if any is highlighted
    pub line: Option<usize>,
    /// Guard ticket for the scroll, when one is issued
    pub scroll_guard: Option<u64>,
}

/// Lyric panel state for the current track
#[derive(Debug, Default)]
pub struct LyricsView {
    lines: Vec<LyricLine>,
    highlighted: Option<usize>,
    status: LyricsStatus,
    user_controlled: bool,
    jump_visible: bool,
    auto_scroll: Debouncer,
    idle: Debouncer,
}

impl LyricsView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[LyricLine] {
        &self.lines
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn highlighted_line(&self) -> Option<&LyricLine> {
        self.highlighted.and_then(|i| self.lines.get(i))
    }

    pub fn status(&self) -> LyricsStatus {
        self.status
    }

    pub fn is_user_controlled(&self) -> bool {
        self.user_controlled
    }

    pub fn jump_visible(&self) -> bool {
        self.jump_visible
    }

    /// Drop everything from the previous track and show `status`
    pub fn reset(&mut self, status: LyricsStatus) {
        self.lines.clear();
        self.highlighted = None;
        self.status = status;
        self.user_controlled = false;
        self.jump_visible = false;
        self.auto_scroll.cancel();
        self.idle.cancel();
    }

    pub fn set_status(&mut self, status: LyricsStatus) {
        self.status = status;
    }

    /// Install freshly parsed lines
    pub fn set_lines(&mut self, lines: Vec<LyricLine>) {
        self.status = if lines.is_empty() {
            LyricsStatus::ParseEmpty
        } else {
            LyricsStatus::Ready(lines.len())
        };
        self.lines = lines;
        self.highlighted = None;
    }

    /// Advance the highlight for playback position `position` (seconds)
    pub fn on_time_update(&mut self, position: f64) -> Option<HighlightChange> {
        let index = line_index_at(&self.lines, position)?;
        if self.highlighted == Some(index) {
            return None;
        }

        let previous = self.highlighted.replace(index);
        let scroll_guard = if self.user_controlled {
            None
        } else {
            Some(self.auto_scroll.arm())
        };
        Some(HighlightChange {
            previous,
            current: index,
            scroll_guard,
        })
    }

    /// The auto-scroll guard window elapsed
    pub fn on_auto_scroll_settled(&mut self, ticket: u64) {
        self.auto_scroll.fire(ticket);
    }

    /// A scroll event arrived from the lyric panel
    pub fn on_scroll(&mut self) -> ScrollReaction {
        if self.auto_scroll.is_armed() {
            return ScrollReaction::Ignored;
        }
        self.user_controlled = true;
        self.jump_visible = true;
        ScrollReaction::UserControlled {
            idle_ticket: self.idle.arm(),
        }
    }

    /// The idle period after a manual scroll elapsed
    pub fn on_scroll_idle(&mut self, ticket: u64) -> Option<Recenter> {
        if !self.idle.fire(ticket) {
            return None;
        }
        Some(self.recenter())
    }

    /// Jump-to-current pressed
    pub fn jump_to_current(&mut self) -> Recenter {
        self.idle.cancel();
        self.recenter()
    }

    fn recenter(&mut self) -> Recenter {
        self.user_controlled = false;
        self.jump_visible = false;
        let scroll_guard = self.highlighted.map(|_| self.auto_scroll.arm());
        Recenter {
            line: self.highlighted,
            scroll_guard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view_with_lines() -> LyricsView {
        let mut view = LyricsView::new();
        view.set_lines(vec![
            LyricLine::new(1.0, "one"),
            LyricLine::new(2.0, "two"),
            LyricLine::new(3.0, "three"),
        ]);
        view
    }

    #[test]
    fn test_no_lines_is_noop() {
        let mut view = LyricsView::new();
        assert_eq!(view.on_time_update(5.0), None);
        assert_eq!(view.highlighted(), None);
    }

    #[test]
    fn test_highlight_transitions() {
        let mut view = view_with_lines();
        let change = view.on_time_update(0.2).unwrap();
        assert_eq!(change.previous, None);
        assert_eq!(change.current, 0);
        assert!(change.scroll_guard.is_some());

        assert_eq!(view.on_time_update(0.9), None);
        let change = view.on_time_update(2.1).unwrap();
        assert_eq!((change.previous, change.current), (Some(0), 1));
    }

    #[test]
    fn test_highlight_is_monotonic_for_increasing_time() {
        let mut view = view_with_lines();
        let mut last = 0;
        let mut t = 0.0;
        while t < 4.0 {
            view.on_time_update(t);
            let current = view.highlighted().unwrap();
            assert!(current >= last);
            last = current;
            t += 0.1;
        }
        assert_eq!(last, 2);
    }

    #[test]
    fn test_own_scroll_is_ignored_during_guard() {
        let mut view = view_with_lines();
        let guard = view.on_time_update(1.5).unwrap().scroll_guard.unwrap();
        assert_eq!(view.on_scroll(), ScrollReaction::Ignored);
        assert!(!view.is_user_controlled());

        view.on_auto_scroll_settled(guard);
        assert!(matches!(
            view.on_scroll(),
            ScrollReaction::UserControlled { .. }
        ));
        assert!(view.is_user_controlled());
        assert!(view.jump_visible());
    }

    #[test]
    fn test_user_control_suppresses_scroll_but_not_highlight() {
        let mut view = view_with_lines();
        view.on_scroll();
        let change = view.on_time_update(2.5).unwrap();
        assert_eq!(change.current, 1);
        assert_eq!(change.scroll_guard, None);
    }

    #[test]
    fn test_idle_returns_control() {
        let mut view = view_with_lines();
        view.on_time_update(2.5);
        let guard = view.on_time_update(3.5).unwrap().scroll_guard.unwrap();
        view.on_auto_scroll_settled(guard);

        let ScrollReaction::UserControlled { idle_ticket: first } = view.on_scroll() else {
            panic!("expected user control");
        };
        let ScrollReaction::UserControlled { idle_ticket: second } = view.on_scroll() else {
            panic!("expected user control");
        };
        // Re-armed: the first deadline no longer counts
        assert_eq!(view.on_scroll_idle(first), None);
        assert!(view.is_user_controlled());

        let recenter = view.on_scroll_idle(second).unwrap();
        assert_eq!(recenter.line, Some(2));
        assert!(recenter.scroll_guard.is_some());
        assert!(!view.is_user_controlled());
        assert!(!view.jump_visible());
    }

    #[test]
    fn test_jump_cancels_pending_idle() {
        let mut view = view_with_lines();
        let ScrollReaction::UserControlled { idle_ticket } = view.on_scroll() else {
            panic!("expected user control");
        };
        let recenter = view.jump_to_current();
        assert_eq!(recenter.line, None);
        assert_eq!(recenter.scroll_guard, None);
        assert_eq!(view.on_scroll_idle(idle_ticket), None);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut view = view_with_lines();
        view.on_time_update(2.0);
        view.on_scroll();
        view.reset(LyricsStatus::Loading);
        assert!(view.lines().is_empty());
        assert_eq!(view.highlighted(), None);
        assert_eq!(view.status(), LyricsStatus::Loading);
        assert!(!view.is_user_controlled());
        assert!(!view.jump_visible());
    }

    #[test]
    fn test_set_lines_status() {
        let mut view = LyricsView::new();
        view.set_lines(Vec::new());
        assert_eq!(view.status(), LyricsStatus::ParseEmpty);
        view.set_lines(vec![LyricLine::new(0.0, "x")]);
        assert_eq!(view.status(), LyricsStatus::Ready(1));
    }
}
