//! Lyrics parsing module
//!
//! - `lrc`: line-level `[mm:ss.xx]text` documents
//! - `types`: the parsed line type and position lookup

mod lrc;
mod types;

pub use lrc::{format_timestamp, parse_lrc};
pub use types::*;

use std::path::Path;

use anyhow::Context;

/// Read and parse an LRC file from disk
pub fn load_lrc_file(path: &Path) -> anyhow::Result<Vec<LyricLine>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read lyrics file {}", path.display()))?;
    Ok(parse_lrc(&content))
}
