//! Utility functions

use std::path::PathBuf;

// ============================================================================
// Paths
// ============================================================================

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "lyricdeck", "LyricDeck")
}

/// Directory holding `settings.json`
pub fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

/// Directory holding persisted player state
pub fn data_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}

// ============================================================================
// Formatting
// ============================================================================

/// Format seconds as `m:ss`
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

// ============================================================================
// Debounce
// ============================================================================

/// Generation-counted debounce timer.
///
/// `arm` hands out a ticket; whoever schedules the delay sends the ticket
/// back when it elapses, and `fire` accepts it only if no newer `arm` or
/// `cancel` happened in between. Cancelling is just bumping the generation.
#[derive(Debug, Clone, Default)]
pub struct Debouncer {
    generation: u64,
    armed: bool,
}

impl Debouncer {
    /// Arm (or re-arm) and return the ticket for the new deadline
    pub fn arm(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.armed = true;
        self.generation
    }

    pub fn cancel(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.armed = false;
    }

    /// Consume a ticket; true when it belongs to the live deadline
    pub fn fire(&mut self, ticket: u64) -> bool {
        if self.armed && ticket == self.generation {
            self.armed = false;
            true
        } else {
            false
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "0:00");
        assert_eq!(format_duration(65.9), "1:05");
        assert_eq!(format_duration(f64::NAN), "0:00");
    }

    #[test]
    fn test_debouncer_rearm_invalidates_old_ticket() {
        let mut timer = Debouncer::default();
        let first = timer.arm();
        let second = timer.arm();
        assert!(!timer.fire(first));
        assert!(timer.is_armed());
        assert!(timer.fire(second));
        assert!(!timer.is_armed());
        assert!(!timer.fire(second));
    }

    #[test]
    fn test_debouncer_cancel() {
        let mut timer = Debouncer::default();
        let ticket = timer.arm();
        timer.cancel();
        assert!(!timer.fire(ticket));
    }
}
