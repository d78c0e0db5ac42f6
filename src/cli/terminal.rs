//! Raw-mode keyboard input and line-based rendering

use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use lyricdeck::PlayerEvent;
use lyricdeck::app::CommandSender;
use lyricdeck::features::lyrics::{LyricLine, LyricsStatus, format_timestamp};
use lyricdeck::utils::format_duration;
use lyricdeck::Message;

const KEY_POLL: Duration = Duration::from_millis(100);

pub const KEY_HELP: &str = "space play/pause  n/p or arrows next/prev  s shuffle  r repeat  \
                            up/down volume  m mute  j jump to lyric  q quit";

/// Raw mode for the lifetime of the guard
pub struct RawMode;

impl RawMode {
    pub fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            tracing::warn!("Failed to restore terminal: {}", e);
        }
    }
}

/// Print a line; raw mode needs an explicit carriage return
pub fn print_line(line: &str) {
    let mut out = io::stdout().lock();
    let _ = write!(out, "{}\r\n", line);
    let _ = out.flush();
}

/// Map a key press to a player command
pub fn message_for_key(key: &KeyEvent) -> Option<Message> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key.code, KeyCode::Char('c')).then_some(Message::Quit);
    }
    let message = match key.code {
        KeyCode::Char(' ') => Message::TogglePlayPause,
        KeyCode::Char('n') | KeyCode::Right => Message::Next,
        KeyCode::Char('p') | KeyCode::Left => Message::Previous,
        KeyCode::Char('s') => Message::ToggleShuffle,
        KeyCode::Char('r') => Message::CycleRepeat,
        KeyCode::Up => Message::AdjustVolume(1),
        KeyCode::Down => Message::AdjustVolume(-1),
        KeyCode::Char('m') => Message::ToggleMute,
        KeyCode::Char('j') => Message::JumpToCurrentLyric,
        KeyCode::Char('q') | KeyCode::Esc => Message::Quit,
        _ => return None,
    };
    Some(message)
}

/// Forward key presses on a blocking thread until the player stops
pub fn spawn_key_reader(commands: CommandSender) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while !commands.is_closed() {
            match event::poll(KEY_POLL) {
                Ok(false) => continue,
                Ok(true) => {}
                Err(e) => {
                    tracing::error!("Keyboard polling failed: {}", e);
                    break;
                }
            }
            let key = match event::read() {
                Ok(Event::Key(key)) => key,
                Ok(_) => continue,
                Err(e) => {
                    tracing::error!("Keyboard read failed: {}", e);
                    break;
                }
            };
            if let Some(message) = message_for_key(&key) {
                let quit = matches!(message, Message::Quit);
                if commands.send(message).is_err() || quit {
                    break;
                }
            }
        }
        tracing::debug!("Key reader stopped");
    })
}

/// Turns player events into printable lines
#[derive(Debug, Default)]
pub struct Renderer {
    lines: Vec<LyricLine>,
    /// Whole seconds of the last printed position
    last_second: Option<u64>,
}

impl Renderer {
    pub fn describe(&mut self, event: PlayerEvent) -> Option<String> {
        match event {
            PlayerEvent::PlaylistLoaded { name, len } => Some(format!(
                "Playlist: {} ({} tracks)",
                name.as_deref().unwrap_or("Untitled"),
                len
            )),
            PlayerEvent::TrackChanged { index, track } => {
                self.last_second = None;
                Some(format!(
                    "[{}] {} - {}",
                    index + 1,
                    track.display_title(),
                    track.display_artist()
                ))
            }
            PlayerEvent::LyricsStatus { status, lines } => {
                self.lines = lines;
                match status {
                    LyricsStatus::Ready(count) => Some(format!("Lyrics: {} lines", count)),
                    other => other.placeholder().map(str::to_string),
                }
            }
            PlayerEvent::HighlightChanged { current, .. } => {
                let line = self.lines.get(current)?;
                Some(format!("  {}  {}", format_timestamp(line.time), line.text))
            }
            PlayerEvent::Position { position, duration } => {
                // Only on minute boundaries, lyrics carry the rest
                let second = position.max(0.0) as u64;
                if self.last_second == Some(second) || second % 60 != 0 {
                    return None;
                }
                self.last_second = Some(second);
                Some(match duration {
                    Some(total) => format!(
                        "  ({} / {})",
                        format_duration(position),
                        format_duration(total)
                    ),
                    None => format!("  ({})", format_duration(position)),
                })
            }
            PlayerEvent::PlaybackState { playing } => {
                Some(if playing { "Playing" } else { "Paused" }.to_string())
            }
            PlayerEvent::ShuffleChanged(on) => {
                Some(format!("Shuffle {}", if on { "on" } else { "off" }))
            }
            PlayerEvent::RepeatChanged(mode) => Some(format!("Repeat: {}", mode)),
            PlayerEvent::VolumeChanged { volume, muted } => Some(if muted {
                "Muted".to_string()
            } else {
                format!("Volume {:.0}%", volume * 100.0)
            }),
            PlayerEvent::SearchResults { query, count } => {
                Some(format!("Search \"{}\": {} results", query, count))
            }
            PlayerEvent::Error(message) => Some(format!("! {}", message)),
            PlayerEvent::ScrollToLine(_)
            | PlayerEvent::JumpButton(_)
            | PlayerEvent::SearchHistory(_)
            | PlayerEvent::BrowseList { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyricdeck::api::Track;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_key_mapping() {
        assert!(matches!(
            message_for_key(&press(KeyCode::Char(' '))),
            Some(Message::TogglePlayPause)
        ));
        assert!(matches!(message_for_key(&press(KeyCode::Right)), Some(Message::Next)));
        assert!(matches!(
            message_for_key(&press(KeyCode::Down)),
            Some(Message::AdjustVolume(-1))
        ));
        assert!(matches!(message_for_key(&press(KeyCode::Char('q'))), Some(Message::Quit)));
        assert!(message_for_key(&press(KeyCode::Char('x'))).is_none());
    }

    #[test]
    fn test_ctrl_c_quits_and_release_ignored() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(matches!(message_for_key(&ctrl_c), Some(Message::Quit)));

        let ctrl_n = KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL);
        assert!(message_for_key(&ctrl_n).is_none());

        let mut release = press(KeyCode::Char('n'));
        release.kind = KeyEventKind::Release;
        assert!(message_for_key(&release).is_none());
    }

    #[test]
    fn test_renderer_highlight_uses_lyric_lines() {
        let mut renderer = Renderer::default();
        let status = renderer.describe(PlayerEvent::LyricsStatus {
            status: LyricsStatus::Ready(2),
            lines: vec![LyricLine::new(0.0, "first"), LyricLine::new(65.5, "second")],
        });
        assert_eq!(status.as_deref(), Some("Lyrics: 2 lines"));

        let line = renderer.describe(PlayerEvent::HighlightChanged {
            previous: Some(0),
            current: 1,
        });
        assert_eq!(line.as_deref(), Some("  [01:05.500]  second"));
        assert!(
            renderer
                .describe(PlayerEvent::HighlightChanged {
                    previous: None,
                    current: 9
                })
                .is_none()
        );
    }

    #[test]
    fn test_renderer_track_and_placeholder() {
        let mut renderer = Renderer::default();
        let track = Track::single("Song", "https://x/a.mp3", None, None);
        assert_eq!(
            renderer
                .describe(PlayerEvent::TrackChanged { index: 0, track })
                .as_deref(),
            Some("[1] Song - Unknown artist")
        );
        assert_eq!(
            renderer
                .describe(PlayerEvent::LyricsStatus {
                    status: LyricsStatus::NoLyrics,
                    lines: Vec::new(),
                })
                .as_deref(),
            Some("No lyrics")
        );
        assert!(renderer.describe(PlayerEvent::JumpButton(true)).is_none());
    }

    #[test]
    fn test_renderer_position_throttled() {
        let mut renderer = Renderer::default();
        assert!(
            renderer
                .describe(PlayerEvent::Position {
                    position: 12.0,
                    duration: Some(180.0)
                })
                .is_none()
        );
        let first = renderer.describe(PlayerEvent::Position {
            position: 60.2,
            duration: Some(180.0),
        });
        assert_eq!(first.as_deref(), Some("  (1:00 / 3:00)"));
        assert!(
            renderer
                .describe(PlayerEvent::Position {
                    position: 60.7,
                    duration: Some(180.0)
                })
                .is_none()
        );
    }
}
