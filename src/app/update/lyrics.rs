//! Lyrics loading and scroll-follow message handlers

use crate::api::MediaKind;
use crate::app::event::PlayerEvent;
use crate::app::message::Message;
use crate::app::state::Player;
use crate::app::task::Task;
use crate::features::lyrics::{LyricsStatus, Recenter, ScrollReaction, parse_lrc};

use super::delay;

impl Player {
    /// Reset the lyric panel and fetch lyrics for the current track
    pub(crate) fn load_lyrics_for_current(&mut self) -> Task<Message> {
        let url = self
            .current_track()
            .and_then(|t| t.lyric_url())
            .map(str::to_string);
        self.lyrics.refresh_used = false;

        let Some(url) = url else {
            self.lyrics.pending_url = None;
            self.lyrics.view.reset(LyricsStatus::NoLyrics);
            self.emit_lyrics_status();
            return Task::none();
        };

        self.lyrics.view.reset(LyricsStatus::Loading);
        self.emit_lyrics_status();
        self.lyrics.pending_url = Some(url.clone());
        self.fetch_lyrics(url)
    }

    fn fetch_lyrics(&self, url: String) -> Task<Message> {
        tracing::debug!("Fetching lyrics: {}", url);
        let source = self.core.services.lyrics.clone();
        Task::perform(
            async move {
                let result = source.fetch(&url).await.map_err(|e| e.to_string());
                (url, result)
            },
            |(url, result)| Message::LyricsFetched { url, result },
        )
    }

    fn emit_lyrics_status(&self) {
        self.emit(PlayerEvent::LyricsStatus {
            status: self.lyrics.view.status(),
            lines: self.lyrics.view.lines().to_vec(),
        });
    }

    fn is_pending_lyrics(&self, url: &str) -> bool {
        self.lyrics.pending_url.as_deref() == Some(url)
    }

    /// Move the highlight to `position` and follow it unless the user
    /// is scrolling
    pub(crate) fn sync_lyrics(&mut self, position: f64) -> Task<Message> {
        let Some(change) = self.lyrics.view.on_time_update(position) else {
            return Task::none();
        };
        self.emit(PlayerEvent::HighlightChanged {
            previous: change.previous,
            current: change.current,
        });

        match change.scroll_guard {
            Some(ticket) => {
                self.emit(PlayerEvent::ScrollToLine(change.current));
                delay(
                    self.core.config.lyrics.auto_scroll_guard(),
                    Message::LyricsAutoScrollSettled(ticket),
                )
            }
            None => Task::none(),
        }
    }

    fn apply_recenter(&mut self, recenter: Recenter) -> Task<Message> {
        self.emit(PlayerEvent::JumpButton(false));
        if let Some(line) = recenter.line {
            self.emit(PlayerEvent::ScrollToLine(line));
        }
        match recenter.scroll_guard {
            Some(ticket) => delay(
                self.core.config.lyrics.auto_scroll_guard(),
                Message::LyricsAutoScrollSettled(ticket),
            ),
            None => Task::none(),
        }
    }

    /// Handle lyrics-related messages
    pub fn handle_lyrics(&mut self, message: &Message) -> Option<Task<Message>> {
        match message {
            Message::LyricsFetched { url, result } => {
                if !self.is_pending_lyrics(url) {
                    tracing::debug!("Discarding stale lyrics for {}", url);
                    return Some(Task::none());
                }

                match result {
                    Ok(text) => {
                        let lines = parse_lrc(text);
                        tracing::debug!("Parsed {} lyric lines from {}", lines.len(), url);
                        self.lyrics.pending_url = None;
                        self.lyrics.view.set_lines(lines);
                        self.emit_lyrics_status();
                        let position = self.core.media.position();
                        Some(self.sync_lyrics(position))
                    }
                    Err(error) => {
                        tracing::warn!("Failed to load lyrics {}: {}", url, error);
                        self.lyrics.view.set_status(LyricsStatus::LoadFailed);
                        self.emit_lyrics_status();

                        if self.lyrics.refresh_used {
                            tracing::warn!("Lyric link refresh already used, giving up");
                            self.lyrics.pending_url = None;
                            return Some(Task::none());
                        }
                        let Some(track) = self.current_track().cloned() else {
                            return Some(Task::none());
                        };
                        self.lyrics.refresh_used = true;

                        let refresher = self.core.services.refresher.clone();
                        let url = url.clone();
                        Some(Task::perform(
                            async move { refresher.refresh(&track, MediaKind::Lrc).await },
                            move |replacement| Message::LyricsLinkRefreshed { url, replacement },
                        ))
                    }
                }
            }

            Message::LyricsLinkRefreshed { url, replacement } => {
                if !self.is_pending_lyrics(url) {
                    tracing::debug!("Discarding stale lyric refresh for {}", url);
                    return Some(Task::none());
                }

                match replacement {
                    Some(new_url) if new_url != url => {
                        tracing::info!("Retrying lyrics with refreshed link");
                        if let Some(index) = self.current_index() {
                            self.library.playlist[index].lrc = Some(new_url.clone());
                        }
                        self.lyrics.pending_url = Some(new_url.clone());
                        self.lyrics.view.set_status(LyricsStatus::Loading);
                        self.emit_lyrics_status();
                        Some(self.fetch_lyrics(new_url.clone()))
                    }
                    _ => {
                        tracing::warn!("No usable replacement lyric link for {}", url);
                        self.lyrics.pending_url = None;
                        Some(Task::none())
                    }
                }
            }

            Message::LyricsScrolled => match self.lyrics.view.on_scroll() {
                ScrollReaction::Ignored => Some(Task::none()),
                ScrollReaction::UserControlled { idle_ticket } => {
                    self.emit(PlayerEvent::JumpButton(true));
                    Some(delay(
                        self.core.config.lyrics.user_scroll_idle(),
                        Message::LyricsScrollIdle(idle_ticket),
                    ))
                }
            },

            Message::LyricsAutoScrollSettled(ticket) => {
                self.lyrics.view.on_auto_scroll_settled(*ticket);
                Some(Task::none())
            }

            Message::LyricsScrollIdle(ticket) => {
                let task = match self.lyrics.view.on_scroll_idle(*ticket) {
                    Some(recenter) => self.apply_recenter(recenter),
                    None => Task::none(),
                };
                Some(task)
            }

            Message::JumpToCurrentLyric => {
                let recenter = self.lyrics.view.jump_to_current();
                Some(self.apply_recenter(recenter))
            }

            _ => None,
        }
    }
}
