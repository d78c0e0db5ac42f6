//! Message update handlers - thin dispatcher delegating to submodules

mod library;
mod lyrics;
mod persistence;
mod playback;
mod player_controller;
mod preload;
pub mod preload_manager;
pub mod queue_navigator;
pub mod retry_guard;

use std::time::Duration;

use super::{Message, Player, Task};

impl Player {
    /// Handle messages by delegating to appropriate submodule handlers
    pub fn update(&mut self, message: Message) -> Task<Message> {
        // Try each handler in order until one handles the message
        if let Some(task) = self.handle_library(&message) {
            return task;
        }
        if let Some(task) = self.handle_playback(&message) {
            return task;
        }
        if let Some(task) = self.handle_media(&message) {
            return task;
        }
        if let Some(task) = self.handle_preload(&message) {
            return task;
        }
        if let Some(task) = self.handle_lyrics(&message) {
            return task;
        }
        if let Some(task) = self.handle_persistence(&message) {
            return task;
        }

        // Default: no task
        Task::none()
    }
}

/// Deliver `message` after `duration`
pub(crate) fn delay(duration: Duration, message: Message) -> Task<Message> {
    Task::perform(tokio::time::sleep(duration), move |_| message)
}
