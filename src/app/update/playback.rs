//! Playback control message handlers

use crate::app::event::PlayerEvent;
use crate::app::message::{Direction, Message};
use crate::app::state::Player;
use crate::app::task::Task;

impl Player {
    /// Set the volume on every slot and remember it
    fn apply_volume(&mut self, volume: f32) {
        if !volume.is_finite() {
            return;
        }
        let volume = volume.clamp(0.0, 1.0);
        self.playback.volume = volume;
        if volume > 0.0 {
            self.playback.last_volume = volume;
        }
        self.core.media.set_volume(volume);
        self.emit(PlayerEvent::VolumeChanged {
            volume,
            muted: self.is_muted(),
        });
        self.persist();
    }

    fn set_playing(&mut self, playing: bool) -> Task<Message> {
        if !self.playback.loaded {
            if playing && !self.library.playlist.is_empty() {
                let index = self.playback.selection.current_index;
                return self.load_song(index, true, 0.0);
            }
            return Task::none();
        }
        self.playback.playing = playing;
        self.apply_play_intent();
        self.persist();
        Task::none()
    }

    /// Handle playback-related messages
    pub fn handle_playback(&mut self, message: &Message) -> Option<Task<Message>> {
        match message {
            Message::PlaySong(index) => {
                tracing::info!("Playing playlist index {}", index);
                Some(self.load_song(*index, true, 0.0))
            }

            Message::Play => Some(self.set_playing(true)),

            Message::Pause => Some(self.set_playing(false)),

            Message::TogglePlayPause => Some(self.set_playing(!self.playback.playing)),

            Message::Seek(position) => {
                if !self.playback.loaded || !position.is_finite() {
                    return Some(Task::none());
                }
                let position = position.max(0.0);
                self.core.media.seek(position);
                self.emit(PlayerEvent::Position {
                    position,
                    duration: self.core.media.duration(),
                });
                Some(self.sync_lyrics(position))
            }

            Message::Next => Some(self.advance(Direction::Forward)),

            Message::Previous => Some(self.advance(Direction::Backward)),

            Message::ToggleShuffle => {
                let len = self.library.playlist.len();
                if self.playback.selection.shuffle {
                    self.playback.selection.disable_shuffle();
                } else {
                    self.playback
                        .selection
                        .enable_shuffle(len, &mut self.core.rng);
                }
                let shuffle = self.playback.selection.shuffle;
                tracing::info!("Shuffle: {}", shuffle);
                self.emit(PlayerEvent::ShuffleChanged(shuffle));
                self.persist();

                // Adjacent tracks changed with the mode
                if self.playback.loaded {
                    return Some(self.preload_adjacent());
                }
                Some(Task::none())
            }

            Message::CycleRepeat => {
                self.playback.repeat = self.playback.repeat.next();
                tracing::info!("Repeat mode: {}", self.playback.repeat);
                self.emit(PlayerEvent::RepeatChanged(self.playback.repeat));
                self.persist();
                Some(Task::none())
            }

            Message::SetVolume(volume) => {
                self.apply_volume(*volume);
                Some(Task::none())
            }

            Message::AdjustVolume(steps) => {
                let step = self.core.config.playback.volume_step;
                self.apply_volume(self.playback.volume + step * *steps as f32);
                Some(Task::none())
            }

            Message::ToggleMute => {
                if self.is_muted() {
                    let restore = self.playback.last_volume.max(0.05);
                    self.apply_volume(restore);
                } else {
                    self.playback.last_volume = self.playback.volume;
                    self.apply_volume(0.0);
                }
                Some(Task::none())
            }

            _ => None,
        }
    }
}
