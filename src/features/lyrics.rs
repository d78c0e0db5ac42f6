//! Lyrics module - parsing and synchronization
//!
//! - `parser`: LRC parsing into timed lines
//! - `sync`: highlight tracking and scroll ownership for the lyric panel

pub mod parser;
pub mod sync;

pub use parser::*;
pub use sync::{HighlightChange, LyricsStatus, LyricsView, Recenter, ScrollReaction};
