//! Preload state machine - manages lookahead slots with proper state tracking
//!
//! This module provides:
//! - State tracking for the previous/next lookahead slots (prevents duplicate requests)
//! - A playlist generation so results from a replaced playlist are dropped
//!
//! ## Architecture
//! PreloadManager is the SINGLE SOURCE OF TRUTH for lookahead state. The
//! media backend only holds the loaded elements; whether a slot may be
//! promoted is decided here.

use crate::audio::Slot;

// ============ Core Types ============

/// State of a preload slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotState {
    /// No preload in progress
    #[default]
    Idle,
    /// Probe/refresh in progress
    Pending,
    /// URL assigned and loading in the media backend
    Loaded,
    /// Probe and refresh both failed
    Failed,
}

/// A lookahead slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreloadSlot {
    /// Playlist index of the buffered track
    pub idx: usize,
    /// URL handed to the media backend once loaded
    pub url: Option<String>,
    pub state: SlotState,
    /// Playlist generation the request was issued for
    pub generation: u64,
}

impl PreloadSlot {
    fn pending(idx: usize, generation: u64) -> Self {
        Self {
            idx,
            url: None,
            state: SlotState::Pending,
            generation,
        }
    }

    /// Check if this slot is for a specific index
    pub fn is_for_index(&self, target_idx: usize) -> bool {
        self.idx == target_idx
    }

    pub fn is_loaded(&self) -> bool {
        self.state == SlotState::Loaded && self.url.is_some()
    }
}

/// Manages preloading for next and previous tracks
#[derive(Debug, Default)]
pub struct PreloadManager {
    generation: u64,
    next: Option<PreloadSlot>,
    prev: Option<PreloadSlot>,
}

impl PreloadManager {
    fn slot_ref(&self, slot: Slot) -> Option<&PreloadSlot> {
        match slot {
            Slot::Next => self.next.as_ref(),
            Slot::Prev => self.prev.as_ref(),
            Slot::Current => None,
        }
    }

    fn slot_mut(&mut self, slot: Slot) -> Option<&mut Option<PreloadSlot>> {
        match slot {
            Slot::Next => Some(&mut self.next),
            Slot::Prev => Some(&mut self.prev),
            Slot::Current => None,
        }
    }

    /// Current playlist generation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Drop all slots and start a new generation (playlist replaced)
    pub fn reset(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.next = None;
        self.prev = None;
    }

    /// Check if we should preload `idx` into `slot`
    pub fn should_preload(&self, idx: usize, slot: Slot) -> bool {
        if slot == Slot::Current {
            return false;
        }
        match self.slot_ref(slot) {
            None => true,
            Some(s) if !s.is_for_index(idx) => true,
            Some(s) => matches!(s.state, SlotState::Idle | SlotState::Failed),
        }
    }

    /// Mark as pending and return the generation to tag the request with
    pub fn mark_pending(&mut self, idx: usize, slot: Slot) -> u64 {
        let generation = self.generation;
        if let Some(entry) = self.slot_mut(slot) {
            *entry = Some(PreloadSlot::pending(idx, generation));
        }
        generation
    }

    /// Apply a finished probe. Returns false when the result is stale: an
    /// older generation, or the slot has since been re-targeted.
    pub fn resolve(&mut self, idx: usize, slot: Slot, generation: u64, url: Option<String>) -> bool {
        if generation != self.generation {
            return false;
        }
        let Some(Some(entry)) = self.slot_mut(slot) else {
            return false;
        };
        if !entry.is_for_index(idx) || entry.state != SlotState::Pending {
            return false;
        }
        match url {
            Some(url) => {
                entry.url = Some(url);
                entry.state = SlotState::Loaded;
            }
            None => entry.state = SlotState::Failed,
        }
        true
    }

    /// Check if the slot holds a loaded track for `idx` (without consuming)
    pub fn is_loaded_for(&self, idx: usize, slot: Slot) -> bool {
        self.slot_ref(slot)
            .is_some_and(|s| s.is_for_index(idx) && s.is_loaded())
    }

    /// Take a loaded slot for `idx` (consumes it)
    pub fn take_loaded(&mut self, idx: usize, slot: Slot) -> Option<PreloadSlot> {
        let entry = self.slot_mut(slot)?;
        match entry {
            Some(s) if s.is_for_index(idx) && s.is_loaded() => entry.take(),
            _ => None,
        }
    }

    /// Forget a slot (e.g. the backend lost it)
    pub fn clear(&mut self, slot: Slot) {
        if let Some(entry) = self.slot_mut(slot) {
            *entry = None;
        }
    }

    /// Invalidate slots that no longer hold the expected indices. Returns the
    /// slots that were dropped so the caller can unload them.
    pub fn invalidate_stale(&mut self, next_idx: Option<usize>, prev_idx: Option<usize>) -> Vec<Slot> {
        let mut dropped = Vec::new();
        for (slot, expected) in [(Slot::Next, next_idx), (Slot::Prev, prev_idx)] {
            let Some(entry) = self.slot_mut(slot) else {
                continue;
            };
            let stale = match (entry.as_ref(), expected) {
                (Some(s), Some(expected)) => !s.is_for_index(expected),
                (Some(_), None) => true,
                (None, _) => false,
            };
            if stale {
                *entry = None;
                dropped.push(slot);
            }
        }
        dropped
    }

    /// Get current slot state (for debugging/UI)
    pub fn state(&self, slot: Slot) -> Option<SlotState> {
        self.slot_ref(slot).map(|s| s.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_blocks_duplicate_requests() {
        let mut manager = PreloadManager::default();
        assert!(manager.should_preload(3, Slot::Next));
        manager.mark_pending(3, Slot::Next);
        assert!(!manager.should_preload(3, Slot::Next));
        assert!(manager.should_preload(4, Slot::Next));
        assert!(manager.should_preload(3, Slot::Prev));
        assert!(!manager.should_preload(3, Slot::Current));
    }

    #[test]
    fn test_resolve_and_take() {
        let mut manager = PreloadManager::default();
        let generation = manager.mark_pending(1, Slot::Prev);
        assert!(manager.resolve(1, Slot::Prev, generation, Some("u1".into())));
        assert!(manager.is_loaded_for(1, Slot::Prev));
        assert_eq!(manager.take_loaded(2, Slot::Prev), None);

        let slot = manager.take_loaded(1, Slot::Prev).unwrap();
        assert_eq!(slot.url.as_deref(), Some("u1"));
        assert_eq!(manager.state(Slot::Prev), None);
    }

    #[test]
    fn test_stale_generation_rejected() {
        let mut manager = PreloadManager::default();
        let generation = manager.mark_pending(1, Slot::Next);
        manager.reset();
        manager.mark_pending(1, Slot::Next);
        assert!(!manager.resolve(1, Slot::Next, generation, Some("old".into())));
        assert_eq!(manager.state(Slot::Next), Some(SlotState::Pending));
    }

    #[test]
    fn test_retargeted_slot_rejects_old_index() {
        let mut manager = PreloadManager::default();
        let generation = manager.mark_pending(1, Slot::Next);
        manager.mark_pending(2, Slot::Next);
        assert!(!manager.resolve(1, Slot::Next, generation, Some("u1".into())));
        assert!(manager.resolve(2, Slot::Next, generation, Some("u2".into())));
    }

    #[test]
    fn test_failed_slot_can_retry() {
        let mut manager = PreloadManager::default();
        let generation = manager.mark_pending(5, Slot::Next);
        assert!(manager.resolve(5, Slot::Next, generation, None));
        assert_eq!(manager.state(Slot::Next), Some(SlotState::Failed));
        assert!(!manager.is_loaded_for(5, Slot::Next));
        assert!(manager.should_preload(5, Slot::Next));
    }

    #[test]
    fn test_invalidate_stale() {
        let mut manager = PreloadManager::default();
        manager.mark_pending(1, Slot::Next);
        manager.mark_pending(0, Slot::Prev);
        let dropped = manager.invalidate_stale(Some(2), Some(0));
        assert_eq!(dropped, vec![Slot::Next]);
        assert_eq!(manager.state(Slot::Prev), Some(SlotState::Pending));

        let dropped = manager.invalidate_stale(None, None);
        assert_eq!(dropped, vec![Slot::Prev]);
    }
}
