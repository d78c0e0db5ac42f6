//! Saving player state to the key-value store

use crate::app::message::Message;
use crate::app::state::Player;
use crate::app::task::Task;
use crate::features::PersistedState;

impl Player {
    /// Current state in its persisted form
    pub fn snapshot(&self) -> PersistedState {
        let loaded = self.playback.loaded;
        PersistedState {
            shuffle: self.playback.selection.shuffle,
            volume: self.playback.volume,
            current_index: self.current_index(),
            position_secs: if loaded {
                self.core.media.position()
            } else {
                0.0
            },
            playing: loaded && self.playback.playing,
            tag: self.library.active_tag.clone(),
            search_term: self.library.active_search.clone(),
            search_history: self.library.search_history.clone(),
            browse_sort: self.library.browse.sort(),
            repeat: self.playback.repeat,
        }
    }

    /// Write the snapshot; failures are logged, never fatal
    pub(crate) fn persist(&self) {
        if let Err(e) = self.snapshot().save(self.core.store.as_ref()) {
            tracing::warn!("Failed to save player state: {:#}", e);
        }
    }

    /// Handle persistence-related messages
    pub fn handle_persistence(&mut self, message: &Message) -> Option<Task<Message>> {
        match message {
            Message::SaveState => {
                // Periodic save only matters while the position moves
                if self.playback.playing {
                    tracing::debug!("Periodic state save");
                    self.persist();
                }
                Some(Task::none())
            }
            Message::Quit => {
                tracing::info!("Saving state before exit");
                self.persist();
                Some(Task::none())
            }
            Message::Noop => Some(Task::none()),
            _ => None,
        }
    }
}
