//! Unified player controller for all track changes
//!
//! Uses QueueNavigator/PlaybackSelection as the single source of truth for
//! index calculations. Every track change ends in `commit_track_change`,
//! which reloads lyrics, re-issues lookahead and persists.

use std::time::Instant;

use crate::api::MediaKind;
use crate::app::event::PlayerEvent;
use crate::app::message::{Direction, Message};
use crate::app::state::Player;
use crate::app::task::Task;
use crate::audio::Slot;
use crate::features::RepeatMode;

impl Player {
    /// Central method to play the track at a playlist index with a fresh load
    ///
    /// Tracks without a media URL are skipped forward.
    pub(crate) fn load_song(&mut self, idx: usize, autoplay: bool, start_at: f64) -> Task<Message> {
        let len = self.library.playlist.len();
        if idx >= len {
            tracing::warn!("Invalid playlist index: {} (len {})", idx, len);
            return Task::none();
        }

        let Some(idx) = self.first_playable_from(idx) else {
            return self.stop_unplayable();
        };

        self.playback.playing = autoplay;
        let url = self.library.playlist[idx].url.clone();
        self.core.media.load(Slot::Current, &url);
        if start_at > 0.0 {
            self.core.media.seek(start_at);
        }
        self.commit_track_change(idx)
    }

    /// Step to the next/previous track, promoting a ready lookahead slot
    /// instead of fetching again
    pub(crate) fn advance(&mut self, direction: Direction) -> Task<Message> {
        if self.library.playlist.is_empty() {
            tracing::warn!("Cannot advance {:?}: playlist is empty", direction);
            return Task::none();
        }

        let Some(target) = self.playable_target(direction) else {
            return self.stop_unplayable();
        };

        let slot = direction.slot();
        if self.try_promote(target, slot) {
            tracing::debug!("Promoted {:?} lookahead for index {}", slot, target);
        } else {
            let url = self.library.playlist[target].url.clone();
            tracing::debug!("Fresh load for index {}", target);
            self.core.media.load(Slot::Current, &url);
        }
        self.commit_track_change(target)
    }

    /// Next index in `direction` that has a media URL
    fn playable_target(&mut self, direction: Direction) -> Option<usize> {
        let len = self.library.playlist.len();
        for _ in 0..len {
            let target = match direction {
                Direction::Forward => self
                    .playback
                    .selection
                    .step_forward(len, &mut self.core.rng)?,
                Direction::Backward => self.playback.selection.step_backward(len)?,
            };
            if self.library.playlist[target].has_media() {
                return Some(target);
            }
            tracing::warn!("Skipping track without media URL at index {}", target);
            self.playback.selection.set_current(target);
        }
        None
    }

    /// First index at or after `idx` (wrapping) that has a media URL
    fn first_playable_from(&self, idx: usize) -> Option<usize> {
        let len = self.library.playlist.len();
        (0..len)
            .map(|offset| (idx + offset) % len)
            .find(|&i| self.library.playlist[i].has_media())
    }

    fn try_promote(&mut self, target: usize, slot: Slot) -> bool {
        if !self.playback.preload.is_loaded_for(target, slot) {
            return false;
        }
        let ready = self.core.media.ready_state(slot);
        if !ready.can_play() {
            tracing::debug!("{:?} lookahead not ready ({:?}), loading fresh", slot, ready);
            return false;
        }
        let Some(entry) = self.playback.preload.take_loaded(target, slot) else {
            return false;
        };
        if self.core.media.source(slot) != entry.url {
            tracing::debug!("{:?} lookahead source changed, loading fresh", slot);
            return false;
        }
        self.core.media.promote(slot)
    }

    /// Bookkeeping shared by promotion and fresh loads
    fn commit_track_change(&mut self, idx: usize) -> Task<Message> {
        let len = self.library.playlist.len();
        let history_limit = self.core.config.playback.history_limit;

        let selection = &mut self.playback.selection;
        selection.set_current(idx);
        selection.ensure_shuffle_order(len, &mut self.core.rng);
        selection.push_history(idx, history_limit);
        self.playback.loaded = true;

        let track = self.library.playlist[idx].clone();
        tracing::info!(
            "Now playing [{}]: {} - {}",
            idx,
            track.display_title(),
            track.display_artist()
        );
        self.emit(PlayerEvent::TrackChanged { index: idx, track });
        self.apply_play_intent();

        let lyrics = self.load_lyrics_for_current();
        let preload = self.preload_adjacent();
        self.persist();
        Task::batch([lyrics, preload])
    }

    /// Make the media element follow the tracked play/pause intent
    pub(crate) fn apply_play_intent(&mut self) {
        if self.playback.playing {
            self.core.media.play();
        } else {
            self.core.media.pause();
        }
        self.emit(PlayerEvent::PlaybackState {
            playing: self.playback.playing,
        });
    }

    /// Every track is unplayable: stop instead of cycling forever
    fn stop_unplayable(&mut self) -> Task<Message> {
        tracing::error!(
            "No playable track in playlist of {} entries, stopping",
            self.library.playlist.len()
        );
        self.playback.playing = false;
        self.playback.loaded = false;
        self.core.media.pause();
        self.core.media.clear(Slot::Current);
        self.lyrics.pending_url = None;
        self.emit(PlayerEvent::Error(
            "No playable tracks in this playlist".to_string(),
        ));
        self.emit(PlayerEvent::PlaybackState { playing: false });
        Task::none()
    }

    /// Give up on the current track and move on
    fn abandon_current(&mut self) -> Task<Message> {
        let title = self
            .current_track()
            .map(|t| t.display_title().to_string())
            .unwrap_or_default();
        tracing::warn!("Giving up on \"{}\"", title);
        self.emit(PlayerEvent::Error(format!(
            "Skipping \"{}\": playback keeps failing",
            title
        )));

        self.playback.abandoned += 1;
        if self.playback.abandoned >= self.library.playlist.len() {
            return self.stop_unplayable();
        }
        self.advance(Direction::Forward)
    }

    /// Handle media element notifications
    pub fn handle_media(&mut self, message: &Message) -> Option<Task<Message>> {
        match message {
            Message::PollMedia => {
                let events = self.core.media.poll_events();
                let tasks: Vec<_> = events
                    .into_iter()
                    .map(|event| self.update(Message::from(event)))
                    .collect();
                Some(Task::batch(tasks))
            }

            Message::MediaTimeUpdate(position) => {
                if !self.playback.loaded {
                    return Some(Task::none());
                }
                if *position > 0.0 && self.playback.playing {
                    self.playback.abandoned = 0;
                }
                self.emit(PlayerEvent::Position {
                    position: *position,
                    duration: self.core.media.duration(),
                });
                Some(self.sync_lyrics(*position))
            }

            Message::MediaEnded => {
                if !self.playback.loaded {
                    return Some(Task::none());
                }
                let len = self.library.playlist.len();
                let current = self.playback.selection.current_index;
                let task = match self.playback.repeat {
                    RepeatMode::RepeatOne => {
                        tracing::debug!("Track ended, repeating");
                        self.core.media.seek(0.0);
                        self.core.media.play();
                        Task::none()
                    }
                    RepeatMode::RepeatAll
                        if !self.playback.selection.shuffle && current + 1 == len =>
                    {
                        tracing::debug!("End of playlist, wrapping to first track");
                        self.load_song(0, true, 0.0)
                    }
                    _ => self.advance(Direction::Forward),
                };
                Some(task)
            }

            Message::MediaError(error) => {
                let Some(track) = self.current_track().cloned() else {
                    return Some(Task::none());
                };
                let index = self.playback.selection.current_index;
                let key = track.retry_key();
                tracing::warn!(
                    "Playback error on \"{}\": {}",
                    track.display_title(),
                    error
                );

                if !self.playback.retry.try_acquire(&key, Instant::now()) {
                    tracing::warn!(
                        "Refresh limit reached for \"{}\" ({} attempts)",
                        key,
                        self.playback.retry.attempts(&key)
                    );
                    return Some(self.abandon_current());
                }

                let position = self.core.media.position();
                let refresher = self.core.services.refresher.clone();
                Some(Task::perform(
                    async move { refresher.refresh(&track, MediaKind::Audio).await },
                    move |url| Message::AudioLinkRefreshed {
                        index,
                        key,
                        position,
                        url,
                    },
                ))
            }

            Message::AudioLinkRefreshed {
                index,
                key,
                position,
                url,
            } => {
                let current = self.current_track().map(|t| t.retry_key());
                if self.current_index() != Some(*index) || current.as_deref() != Some(key) {
                    tracing::debug!("Discarding stale audio refresh for index {}", index);
                    return Some(Task::none());
                }
                let Some(url) = url else {
                    tracing::warn!("No replacement link for \"{}\"", key);
                    return Some(self.abandon_current());
                };

                tracing::info!("Reloading \"{}\" with refreshed link", key);
                self.library.playlist[*index].url = url.clone();
                self.core.media.load(Slot::Current, url);
                if *position > 0.0 {
                    self.core.media.seek(*position);
                }
                self.apply_play_intent();
                Some(Task::none())
            }

            _ => None,
        }
    }
}
