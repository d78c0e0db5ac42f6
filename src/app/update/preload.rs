//! Lookahead buffering for seamless track switching
//!
//! - QueueNavigator for consistent index calculations (Single Source of Truth)
//! - PreloadManager for state tracking (prevents duplicate requests)
//! - The media backend holds the silent previous/next elements

use std::time::Duration;

use crate::api::{MediaKind, ProbeOutcome, Services, Track};
use crate::app::message::Message;
use crate::app::state::Player;
use crate::app::task::Task;
use crate::audio::Slot;

use super::queue_navigator::QueueNavigator;

impl Player {
    /// Create a QueueNavigator for the current state
    fn queue_navigator(&self) -> QueueNavigator<'_> {
        QueueNavigator::new(self.library.playlist.len(), &self.playback.selection)
    }

    /// Fill the previous/next slots for the current track
    /// Called after every track change
    pub(crate) fn preload_adjacent(&mut self) -> Task<Message> {
        let current = self.playback.selection.current_index;
        let Some(adjacent) = self.queue_navigator().adjacent_indices() else {
            return Task::none();
        };

        // A single-track playlist (or an empty history) points at itself
        let next = (adjacent.next != current).then_some(adjacent.next);
        let prev = (adjacent.prev != current).then_some(adjacent.prev);

        // Invalidate stale preloads
        for slot in self.playback.preload.invalidate_stale(next, prev) {
            tracing::debug!("Dropping stale {:?} lookahead", slot);
            self.core.media.clear(slot);
        }

        let mut tasks = Vec::new();

        // Preload next track (higher priority)
        if let Some(next_idx) = next {
            tasks.extend(self.preload_track(next_idx, Slot::Next));
        }

        // Preload prev track
        if let Some(prev_idx) = prev {
            tasks.extend(self.preload_track(prev_idx, Slot::Prev));
        }

        Task::batch(tasks)
    }

    /// Preload a specific track
    /// Returns None if already preloaded or preloading
    fn preload_track(&mut self, idx: usize, slot: Slot) -> Option<Task<Message>> {
        let track = self.library.playlist.get(idx)?;
        if !track.has_media() {
            tracing::debug!("No media URL for lookahead index {}", idx);
            return None;
        }

        // Check if we should preload
        if !self.playback.preload.should_preload(idx, slot) {
            return None;
        }

        let track = track.clone();
        let generation = self.playback.preload.mark_pending(idx, slot);
        tracing::debug!(
            "Preloading index {} into {:?} (generation {})",
            idx,
            slot,
            generation
        );

        let services = self.core.services.clone();
        let timeout = self.core.config.probe_timeout;
        Some(Task::perform(
            resolve_media_url(services, track, timeout),
            move |url| Message::PreloadResolved {
                slot,
                index: idx,
                generation,
                url,
            },
        ))
    }

    /// Handle preload-related messages
    pub fn handle_preload(&mut self, message: &Message) -> Option<Task<Message>> {
        match message {
            Message::PreloadResolved {
                slot,
                index,
                generation,
                url,
            } => {
                if !self
                    .playback
                    .preload
                    .resolve(*index, *slot, *generation, url.clone())
                {
                    tracing::debug!(
                        "Discarding stale lookahead for index {} ({:?}, generation {})",
                        index,
                        slot,
                        generation
                    );
                    return Some(Task::none());
                }

                match url {
                    Some(url) => {
                        if let Some(track) = self.library.playlist.get_mut(*index) {
                            if track.url != *url {
                                tracing::info!(
                                    "Lookahead refreshed link for \"{}\"",
                                    track.display_title()
                                );
                                track.url = url.clone();
                            }
                        }
                        self.core.media.load(*slot, url);
                    }
                    None => {
                        tracing::warn!(
                            "Lookahead for index {} failed; {:?} slot left empty",
                            index,
                            slot
                        );
                        self.core.media.clear(*slot);
                    }
                }
                Some(Task::none())
            }
            _ => None,
        }
    }
}

/// Probe the track's URL and fall back to one link refresh
///
/// A probe that does not answer within `timeout` counts as valid.
async fn resolve_media_url(services: Services, track: Track, timeout: Duration) -> Option<String> {
    let outcome = tokio::time::timeout(timeout, services.probe.probe(&track.url))
        .await
        .unwrap_or(ProbeOutcome::TimedOut);
    if outcome.is_usable() {
        return Some(track.url);
    }

    tracing::debug!(
        "Probe failed for \"{}\", requesting a fresh link",
        track.display_title()
    );
    services.refresher.refresh(&track, MediaKind::Audio).await
}
