//! Standard LRC format parser
//!
//! Supports the common `[mm:ss.xx]text` / `[mm:ss.xxx]text` format with
//! line-level synchronization. A line may carry several timestamps, each of
//! which produces its own entry.

use std::fmt::Write;

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::LyricLine;

/// Two-digit minutes and seconds, two or three fraction digits
static TIMESTAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[(\d{2}):(\d{2})\.(\d{2,3})\]").expect("timestamp pattern is valid")
});

/// Header tags that never carry lyric text
const METADATA_PREFIXES: [&str; 4] = ["[ti:", "[ar:", "[al:", "[by:"];

fn is_metadata(line: &str) -> bool {
    METADATA_PREFIXES.iter().any(|prefix| line.starts_with(prefix))
}

/// Convert one regex capture into seconds
fn capture_seconds(caps: &regex::Captures<'_>) -> Option<f64> {
    let minutes: u32 = caps.get(1)?.as_str().parse().ok()?;
    let seconds: u32 = caps.get(2)?.as_str().parse().ok()?;
    let fraction = caps.get(3)?.as_str();
    let mut millis: u32 = fraction.parse().ok()?;
    // Centiseconds
    if fraction.len() == 2 {
        millis *= 10;
    }
    Some(f64::from(minutes * 60 + seconds) + f64::from(millis) / 1000.0)
}

/// Parse a single line, which may have multiple timestamps
fn parse_line(line: &str) -> Vec<LyricLine> {
    let times: Vec<f64> = TIMESTAMP
        .captures_iter(line)
        .filter_map(|caps| capture_seconds(&caps))
        .collect();
    if times.is_empty() {
        return Vec::new();
    }

    let text = TIMESTAMP.replace_all(line, "");
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    times
        .into_iter()
        .map(|time| LyricLine::new(time, text))
        .collect()
}

/// Parse LRC content into lyric lines sorted by time.
///
/// Never fails: malformed lines are skipped and an empty result means the
/// document had no usable lyrics.
pub fn parse_lrc(src: &str) -> Vec<LyricLine> {
    let mut result = Vec::new();

    for line in src.lines() {
        let line = line.trim();
        if line.is_empty() || is_metadata(line) {
            continue;
        }
        result.extend(parse_line(line));
    }

    // Stable: equal timestamps keep document order
    result.sort_by(|a, b| a.time.total_cmp(&b.time));
    result
}

/// Format seconds as an LRC timestamp `[mm:ss.mmm]`
pub fn format_timestamp(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let sec = (total_ms / 1000) % 60;
    let min = total_ms / 60_000;
    let mut out = String::with_capacity(11);
    let _ = write!(out, "[{:02}:{:02}.{:03}]", min, sec, ms);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let lines = parse_lrc("[00:01.00]Hello\n[00:02.50]World");
        assert_eq!(
            lines,
            vec![LyricLine::new(1.0, "Hello"), LyricLine::new(2.5, "World")]
        );
    }

    #[test]
    fn test_two_digit_fraction_is_centiseconds() {
        let lines = parse_lrc("[00:01.20]Hello\n[00:01.2]Hello");
        assert_eq!(lines.len(), 1);
        assert!((lines[0].time - 1.2).abs() < 1e-9);
        assert_eq!(lines[0].text, "Hello");
    }

    #[test]
    fn test_three_digit_fraction() {
        let lines = parse_lrc("[01:02.345]x");
        assert!((lines[0].time - 62.345).abs() < 1e-9);
    }

    #[test]
    fn test_multiple_tags_on_one_line() {
        let lines = parse_lrc("[00:10.00][00:05.00]Chorus\n[00:07.00]Verse");
        let times: Vec<f64> = lines.iter().map(|l| l.time).collect();
        assert_eq!(times, vec![5.0, 7.0, 10.0]);
        assert_eq!(lines[0].text, "Chorus");
        assert_eq!(lines[2].text, "Chorus");
    }

    #[test]
    fn test_metadata_only_document_is_empty() {
        let doc = "[ti:Title]\n[ar:Artist]\n[al:Album]\n[by:someone]\n";
        assert!(parse_lrc(doc).is_empty());
    }

    #[test]
    fn test_tag_without_text_is_dropped() {
        assert!(parse_lrc("[00:03.00]   \n[00:04.00]").is_empty());
    }

    #[test]
    fn test_untagged_and_malformed_lines_skipped() {
        let doc = "plain text\n[0:01.00]short minutes\n[00:01.0000]long fraction\n[00:09.99]ok";
        let lines = parse_lrc(doc);
        assert_eq!(lines, vec![LyricLine::new(9.99, "ok")]);
    }

    #[test]
    fn test_inline_tags_are_stripped() {
        let lines = parse_lrc("  [00:01.00]Hel[00:01.50]lo  ");
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.text == "Hello"));
    }

    #[test]
    fn test_equal_times_keep_document_order() {
        let lines = parse_lrc("[00:01.00]first\n[00:01.00]second");
        assert_eq!(lines[0].text, "first");
        assert_eq!(lines[1].text, "second");
    }

    #[test]
    fn test_crlf_input() {
        let lines = parse_lrc("[00:01.00]a\r\n[00:02.00]b\r\n");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "a");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "[00:00.000]");
        assert_eq!(format_timestamp(62.345), "[01:02.345]");
        assert_eq!(format_timestamp(-3.0), "[00:00.000]");
    }
}
