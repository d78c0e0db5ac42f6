//! Unified queue navigation - Single Source of Truth for index calculations
//!
//! Sequential mode wraps around the playlist. Shuffle mode walks a fixed
//! permutation (current track first) and goes back through the play history.
//! Lookahead, track changes and the UI all derive their indices from here.

use rand::Rng;

/// Current position, shuffle order and recent history
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackSelection {
    pub current_index: usize,
    pub shuffle: bool,
    /// Permutation of playlist indices, valid only while `shuffle` is on
    pub shuffle_order: Vec<usize>,
    /// Position of `current_index` within `shuffle_order`
    pub shuffle_position: usize,
    /// Recently played indices, oldest first
    pub history: Vec<usize>,
}

/// Indices the lookahead slots should hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjacentIndices {
    pub prev: usize,
    pub next: usize,
}

/// Random permutation of `0..len` with `current` first and the rest
/// Fisher-Yates shuffled
pub fn create_shuffled_order<R: Rng + ?Sized>(len: usize, current: usize, rng: &mut R) -> Vec<usize> {
    if len == 0 {
        return Vec::new();
    }
    let current = current.min(len - 1);
    let mut rest: Vec<usize> = (0..len).filter(|&i| i != current).collect();
    for i in (1..rest.len()).rev() {
        let j = rng.random_range(0..=i);
        rest.swap(i, j);
    }
    let mut order = Vec::with_capacity(len);
    order.push(current);
    order.extend(rest);
    order
}

/// Read-only index calculations over a selection
pub struct QueueNavigator<'a> {
    queue_len: usize,
    selection: &'a PlaybackSelection,
}

impl<'a> QueueNavigator<'a> {
    pub fn new(queue_len: usize, selection: &'a PlaybackSelection) -> Self {
        Self {
            queue_len,
            selection,
        }
    }

    fn order_is_valid(&self) -> bool {
        self.selection.shuffle_order.len() == self.queue_len
            && self.selection.shuffle_order.get(self.selection.shuffle_position)
                == Some(&self.selection.current_index)
    }

    /// Calculate the next track index
    pub fn next_index(&self) -> Option<usize> {
        if self.queue_len == 0 {
            return None;
        }
        let current = self.selection.current_index;
        if self.selection.shuffle && self.order_is_valid() {
            let pos = (self.selection.shuffle_position + 1) % self.queue_len;
            return self.selection.shuffle_order.get(pos).copied();
        }
        Some((current + 1) % self.queue_len)
    }

    /// Calculate the previous track index
    pub fn prev_index(&self) -> Option<usize> {
        if self.queue_len == 0 {
            return None;
        }
        let current = self.selection.current_index;
        if self.selection.shuffle {
            let history = &self.selection.history;
            return Some(if history.len() > 1 {
                history[history.len() - 2]
            } else {
                current
            });
        }
        Some((current + self.queue_len - 1) % self.queue_len)
    }

    /// Get both adjacent indices at once; `None` for an empty playlist
    pub fn adjacent_indices(&self) -> Option<AdjacentIndices> {
        Some(AdjacentIndices {
            prev: self.prev_index()?,
            next: self.next_index()?,
        })
    }
}

impl PlaybackSelection {
    /// Regenerate the shuffle order when it no longer matches the playlist
    /// or the current track, otherwise re-sync the position.
    pub fn ensure_shuffle_order<R: Rng + ?Sized>(&mut self, queue_len: usize, rng: &mut R) {
        if !self.shuffle {
            return;
        }
        let position = self
            .shuffle_order
            .iter()
            .position(|&i| i == self.current_index);
        match position {
            Some(pos) if self.shuffle_order.len() == queue_len => self.shuffle_position = pos,
            _ => {
                self.shuffle_order = create_shuffled_order(queue_len, self.current_index, rng);
                self.shuffle_position = 0;
                tracing::debug!("Shuffle order regenerated for {} tracks", queue_len);
            }
        }
    }

    /// Turn shuffle on: fresh order with the current track first, history
    /// restarted from the current track
    pub fn enable_shuffle<R: Rng + ?Sized>(&mut self, queue_len: usize, rng: &mut R) {
        self.shuffle = true;
        self.shuffle_order = create_shuffled_order(queue_len, self.current_index, rng);
        self.shuffle_position = 0;
        self.history = if queue_len > 0 {
            vec![self.current_index]
        } else {
            Vec::new()
        };
    }

    pub fn disable_shuffle(&mut self) {
        self.shuffle = false;
    }

    /// Forget position, history and shuffle order for a replacement playlist.
    /// The order is rebuilt around the first track actually loaded.
    pub fn reset_for_playlist(&mut self) {
        self.current_index = 0;
        self.history.clear();
        self.shuffle_order.clear();
        self.shuffle_position = 0;
    }

    /// Target of a forward step; moves the shuffle position
    pub fn step_forward<R: Rng + ?Sized>(&mut self, queue_len: usize, rng: &mut R) -> Option<usize> {
        if queue_len == 0 {
            return None;
        }
        if self.shuffle {
            self.ensure_shuffle_order(queue_len, rng);
            self.shuffle_position = (self.shuffle_position + 1) % queue_len;
            return self.shuffle_order.get(self.shuffle_position).copied();
        }
        Some((self.current_index + 1) % queue_len)
    }

    /// Target of a backward step; pops history in shuffle mode
    pub fn step_backward(&mut self, queue_len: usize) -> Option<usize> {
        if queue_len == 0 {
            return None;
        }
        if self.shuffle && self.history.len() > 1 {
            self.history.pop();
            let target = *self.history.last()?;
            if let Some(pos) = self.shuffle_order.iter().position(|&i| i == target) {
                self.shuffle_position = pos;
            }
            return Some(target);
        }
        Some((self.current_index + queue_len - 1) % queue_len)
    }

    /// Point the selection at `index`, keeping the shuffle position in sync
    pub fn set_current(&mut self, index: usize) {
        self.current_index = index;
        if let Some(pos) = self.shuffle_order.iter().position(|&i| i == index) {
            self.shuffle_position = pos;
        }
    }

    /// Record a completed track change
    pub fn push_history(&mut self, index: usize, limit: usize) {
        if self.history.last() != Some(&index) {
            self.history.push(index);
        }
        if self.history.len() > limit {
            let excess = self.history.len() - limit;
            self.history.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_empty_playlist_has_no_adjacent() {
        let selection = PlaybackSelection::default();
        assert_eq!(QueueNavigator::new(0, &selection).adjacent_indices(), None);
    }

    #[test]
    fn test_single_track_points_at_itself() {
        let selection = PlaybackSelection::default();
        assert_eq!(
            QueueNavigator::new(1, &selection).adjacent_indices(),
            Some(AdjacentIndices { prev: 0, next: 0 })
        );
    }

    #[test]
    fn test_sequential_wraps() {
        let mut selection = PlaybackSelection::default();
        assert_eq!(
            QueueNavigator::new(4, &selection).adjacent_indices(),
            Some(AdjacentIndices { prev: 3, next: 1 })
        );
        selection.current_index = 3;
        assert_eq!(
            QueueNavigator::new(4, &selection).adjacent_indices(),
            Some(AdjacentIndices { prev: 2, next: 0 })
        );
    }

    #[test]
    fn test_shuffled_order_is_permutation_with_current_first() {
        let mut rng = rng();
        for len in 1..20 {
            let current = len / 2;
            let order = create_shuffled_order(len, current, &mut rng);
            assert_eq!(order[0], current);
            let mut sorted = order.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, (0..len).collect::<Vec<_>>());
        }
        assert!(create_shuffled_order(0, 0, &mut rng).is_empty());
    }

    #[test]
    fn test_shuffle_adjacent_uses_order_and_history() {
        let mut rng = rng();
        let mut selection = PlaybackSelection {
            current_index: 2,
            ..Default::default()
        };
        selection.enable_shuffle(5, &mut rng);
        let nav = QueueNavigator::new(5, &selection);
        // No history yet: previous is the current track
        assert_eq!(nav.prev_index(), Some(2));
        assert_eq!(nav.next_index(), Some(selection.shuffle_order[1]));

        selection.push_history(4, 10);
        selection.set_current(4);
        let nav = QueueNavigator::new(5, &selection);
        assert_eq!(nav.prev_index(), Some(2));
    }

    #[test]
    fn test_step_forward_visits_every_track_once() {
        let mut rng = rng();
        let mut selection = PlaybackSelection::default();
        selection.enable_shuffle(6, &mut rng);
        let mut seen = vec![selection.current_index];
        for _ in 0..5 {
            let next = selection.step_forward(6, &mut rng).unwrap();
            selection.set_current(next);
            seen.push(next);
        }
        seen.sort_unstable();
        assert_eq!(seen, (0..6).collect::<Vec<_>>());
    }

    #[test]
    fn test_step_backward_pops_history() {
        let mut selection = PlaybackSelection {
            shuffle: true,
            shuffle_order: vec![0, 3, 1, 2],
            shuffle_position: 2,
            current_index: 1,
            history: vec![0, 3, 1],
        };
        assert_eq!(selection.step_backward(4), Some(3));
        assert_eq!(selection.history, vec![0, 3]);
        assert_eq!(selection.shuffle_position, 1);
    }

    #[test]
    fn test_step_backward_without_history_is_sequential() {
        let mut selection = PlaybackSelection {
            shuffle: true,
            current_index: 0,
            history: vec![0],
            ..Default::default()
        };
        assert_eq!(selection.step_backward(3), Some(2));
        selection.shuffle = false;
        assert_eq!(selection.step_backward(0), None);
    }

    #[test]
    fn test_order_regenerated_on_size_change() {
        let mut rng = rng();
        let mut selection = PlaybackSelection::default();
        selection.enable_shuffle(3, &mut rng);
        selection.ensure_shuffle_order(5, &mut rng);
        assert_eq!(selection.shuffle_order.len(), 5);
        assert_eq!(selection.shuffle_order[0], selection.current_index);
    }

    #[test]
    fn test_history_cap_and_no_duplicates() {
        let mut selection = PlaybackSelection::default();
        for i in 0..15 {
            selection.push_history(i, 10);
            selection.push_history(i, 10);
        }
        assert_eq!(selection.history, (5..15).collect::<Vec<_>>());
    }

    #[test]
    fn test_replacement_order_starts_with_loaded_track() {
        let mut rng = rng();
        let mut selection = PlaybackSelection::default();
        selection.enable_shuffle(4, &mut rng);
        selection.reset_for_playlist();
        assert!(selection.shuffle_order.is_empty());

        selection.set_current(3);
        selection.ensure_shuffle_order(6, &mut rng);
        assert_eq!(selection.shuffle_order[0], 3);
        assert_eq!(selection.shuffle_order.len(), 6);
        assert_eq!(selection.shuffle_position, 0);
    }

    #[test]
    fn test_enable_shuffle_resets_history() {
        let mut rng = rng();
        let mut selection = PlaybackSelection {
            current_index: 1,
            history: vec![0, 2, 1],
            ..Default::default()
        };
        selection.enable_shuffle(3, &mut rng);
        assert_eq!(selection.history, vec![1]);
    }
}
