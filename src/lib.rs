//! lyricdeck - a headless music player core
//!
//! Owns the playlist, the lookahead (previous/next) media slots, shuffle and
//! history bookkeeping and a time-synced LRC lyric engine. Everything outside
//! the core (catalog HTTP API, media element, storage, rendering) sits behind
//! traits so a terminal, GUI or browser front end can drive the same player.

pub mod api;
pub mod app;
pub mod audio;
pub mod features;
pub mod utils;

pub use app::{Message, Player, PlayerEvent, Task};
