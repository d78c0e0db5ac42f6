//! Lyrics data types

use serde::{Deserialize, Serialize};

/// A single timed lyric line
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LyricLine {
    /// Start time in seconds
    pub time: f64,
    /// Display text (never empty)
    pub text: String,
}

impl LyricLine {
    pub fn new(time: f64, text: impl Into<String>) -> Self {
        Self {
            time,
            text: text.into(),
        }
    }
}

/// Index of the line that should be highlighted at `position` seconds.
///
/// The highlighted line is the last one whose time is `<= position`; before
/// the first timestamp the first line is returned. `lines` must be sorted.
pub fn line_index_at(lines: &[LyricLine], position: f64) -> Option<usize> {
    if lines.is_empty() {
        return None;
    }
    let after = lines.partition_point(|line| line.time <= position);
    Some(after.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines() -> Vec<LyricLine> {
        vec![
            LyricLine::new(1.0, "a"),
            LyricLine::new(2.5, "b"),
            LyricLine::new(2.5, "b'"),
            LyricLine::new(4.0, "c"),
        ]
    }

    #[test]
    fn test_index_before_first_line_is_zero() {
        assert_eq!(line_index_at(&lines(), 0.0), Some(0));
    }

    #[test]
    fn test_index_boundaries() {
        let lines = lines();
        assert_eq!(line_index_at(&lines, 1.0), Some(0));
        assert_eq!(line_index_at(&lines, 2.49), Some(0));
        assert_eq!(line_index_at(&lines, 2.5), Some(2));
        assert_eq!(line_index_at(&lines, 100.0), Some(3));
    }

    #[test]
    fn test_index_empty() {
        assert_eq!(line_index_at(&[], 3.0), None);
    }
}
