//! Feature modules - business logic separated from the player loop
//!
//! Each feature module contains the core logic for a specific functionality
//! and does no I/O of its own beyond its storage files.

pub mod browse;
pub mod lyrics;
pub mod settings;
pub mod storage;

pub use browse::BrowseState;
pub use settings::{RepeatMode, Settings};
pub use storage::{Change, FileStore, MemoryStore, PersistedState, SortOrder, StateStore};
