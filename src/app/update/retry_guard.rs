//! Per-track cap on playback link refreshes
//!
//! A track whose media keeps failing is refreshed at most `max_attempts`
//! times per window; after that the player gives up on it and moves on.

use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct Attempts {
    count: u32,
    window_start: Instant,
}

/// Refresh attempt counter keyed by track id (or title)
#[derive(Debug)]
pub struct RetryGuard {
    max_attempts: u32,
    window: Duration,
    entries: HashMap<String, Attempts>,
}

impl RetryGuard {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            entries: HashMap::new(),
        }
    }

    /// Record an attempt for `key`; false when the cap is reached
    pub fn try_acquire(&mut self, key: &str, now: Instant) -> bool {
        let entry = self.entries.entry(key.to_string()).or_insert(Attempts {
            count: 0,
            window_start: now,
        });
        if now.saturating_duration_since(entry.window_start) >= self.window {
            entry.count = 0;
            entry.window_start = now;
        }
        if entry.count >= self.max_attempts {
            return false;
        }
        entry.count += 1;
        true
    }

    /// Attempts used in the current window
    pub fn attempts(&self, key: &str) -> u32 {
        self.entries.get(key).map(|a| a.count).unwrap_or(0)
    }

    /// Forget everything (playlist replaced)
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cap_within_window() {
        let mut guard = RetryGuard::new(3, Duration::from_secs(60));
        let now = Instant::now();
        assert!(guard.try_acquire("song", now));
        assert!(guard.try_acquire("song", now + Duration::from_secs(1)));
        assert!(guard.try_acquire("song", now + Duration::from_secs(2)));
        assert!(!guard.try_acquire("song", now + Duration::from_secs(3)));
        assert_eq!(guard.attempts("song"), 3);
        // Other keys are independent
        assert!(guard.try_acquire("other", now));
    }

    #[test]
    fn test_window_expiry_resets() {
        let mut guard = RetryGuard::new(1, Duration::from_secs(60));
        let now = Instant::now();
        assert!(guard.try_acquire("song", now));
        assert!(!guard.try_acquire("song", now + Duration::from_secs(59)));
        assert!(guard.try_acquire("song", now + Duration::from_secs(60)));
    }

    #[test]
    fn test_clear() {
        let mut guard = RetryGuard::new(1, Duration::from_secs(60));
        let now = Instant::now();
        guard.try_acquire("song", now);
        guard.clear();
        assert_eq!(guard.attempts("song"), 0);
    }
}
