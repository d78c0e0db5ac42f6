//! Persisted player state
//!
//! A small string key-value store (the moral equivalent of browser local
//! storage) plus a typed view over the keys the player uses. Reads are
//! tolerant: a missing or corrupt value falls back to its default.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::settings::RepeatMode;

/// Maximum remembered search terms
pub const SEARCH_HISTORY_LIMIT: usize = 10;

mod keys {
    pub const SHUFFLE: &str = "shuffle";
    pub const VOLUME: &str = "volume";
    pub const INDEX: &str = "current_index";
    pub const POSITION: &str = "position_secs";
    pub const PLAYING: &str = "playing";
    pub const TAG: &str = "tag";
    pub const SEARCH: &str = "search_term";
    pub const SEARCH_HISTORY: &str = "search_history";
    pub const BROWSE_SORT: &str = "browse_sort";
    pub const REPEAT: &str = "repeat_mode";
}

/// One key update in a batch; `None` removes the key
pub type Change = (&'static str, Option<String>);

/// String key-value storage
pub trait StateStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String) -> anyhow::Result<()>;
    fn remove(&self, key: &str) -> anyhow::Result<()>;

    /// Apply several updates at once
    fn set_many(&self, changes: Vec<Change>) -> anyhow::Result<()> {
        for (key, value) in changes {
            match value {
                Some(value) => self.set(key, value)?,
                None => self.remove(key)?,
            }
        }
        Ok(())
    }
}

// ============ In-memory store ============

/// Volatile store for tests and `--no-persist`
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) -> anyhow::Result<()> {
        self.entries.lock().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

// ============ File store ============

/// JSON object file, rewritten once per changed batch
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`; a missing or corrupt file starts empty
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Discarding corrupt state file {:?}: {}", path, e);
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!("Failed to read state file {:?}: {}", path, e);
                BTreeMap::new()
            }
        };
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }
}

impl StateStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) -> anyhow::Result<()> {
        let mut entries = self.entries.lock();
        if entries.get(key) == Some(&value) {
            return Ok(());
        }
        entries.insert(key.to_string(), value);
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        let mut entries = self.entries.lock();
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }

    fn set_many(&self, changes: Vec<Change>) -> anyhow::Result<()> {
        let mut entries = self.entries.lock();
        let mut dirty = false;
        for (key, value) in changes {
            match value {
                Some(value) => {
                    if entries.get(key) != Some(&value) {
                        entries.insert(key.to_string(), value);
                        dirty = true;
                    }
                }
                None => dirty |= entries.remove(key).is_some(),
            }
        }
        if dirty {
            self.flush(&entries)?;
        }
        Ok(())
    }
}

// ============ Typed view ============

/// Browse list ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "title-asc")]
    TitleAsc,
    #[serde(rename = "title-desc")]
    TitleDesc,
    #[serde(rename = "artist-asc")]
    ArtistAsc,
    #[serde(rename = "artist-desc")]
    ArtistDesc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::TitleAsc => "title-asc",
            SortOrder::TitleDesc => "title-desc",
            SortOrder::ArtistAsc => "artist-asc",
            SortOrder::ArtistDesc => "artist-desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "title-asc" => Some(SortOrder::TitleAsc),
            "title-desc" => Some(SortOrder::TitleDesc),
            "artist-asc" => Some(SortOrder::ArtistAsc),
            "artist-desc" => Some(SortOrder::ArtistDesc),
            _ => None,
        }
    }
}

/// Snapshot of everything the player restores on startup
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedState {
    pub shuffle: bool,
    pub volume: f32,
    pub current_index: Option<usize>,
    pub position_secs: f64,
    pub playing: bool,
    pub tag: Option<String>,
    pub search_term: Option<String>,
    pub search_history: Vec<String>,
    pub browse_sort: SortOrder,
    pub repeat: RepeatMode,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            shuffle: false,
            volume: 1.0,
            current_index: None,
            position_secs: 0.0,
            playing: false,
            tag: None,
            search_term: None,
            search_history: Vec::new(),
            browse_sort: SortOrder::default(),
            repeat: RepeatMode::default(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl PersistedState {
    /// Read every key, defaulting anything missing or malformed
    pub fn load(store: &dyn StateStore) -> Self {
        let defaults = Self::default();
        let volume = store
            .get(keys::VOLUME)
            .and_then(|v| v.parse::<f32>().ok())
            .filter(|v| v.is_finite())
            .map(|v| v.clamp(0.0, 1.0))
            .unwrap_or(defaults.volume);
        let position_secs = store
            .get(keys::POSITION)
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v >= 0.0)
            .unwrap_or(0.0);
        let search_history: Vec<String> = store
            .get(keys::SEARCH_HISTORY)
            .and_then(|v| serde_json::from_str(&v).ok())
            .unwrap_or_default();

        Self {
            shuffle: store.get(keys::SHUFFLE).as_deref() == Some("true"),
            volume,
            current_index: store.get(keys::INDEX).and_then(|v| v.parse().ok()),
            position_secs,
            playing: store.get(keys::PLAYING).as_deref() == Some("true"),
            tag: non_empty(store.get(keys::TAG)),
            search_term: non_empty(store.get(keys::SEARCH)),
            search_history: search_history
                .into_iter()
                .take(SEARCH_HISTORY_LIMIT)
                .collect(),
            browse_sort: store
                .get(keys::BROWSE_SORT)
                .and_then(|v| SortOrder::parse(&v))
                .unwrap_or_default(),
            repeat: store
                .get(keys::REPEAT)
                .and_then(|v| serde_json::from_str(&v).ok())
                .unwrap_or_default(),
        }
    }

    /// Write every key back in one batch
    pub fn save(&self, store: &dyn StateStore) -> anyhow::Result<()> {
        let changes = vec![
            (keys::SHUFFLE, Some(self.shuffle.to_string())),
            (keys::VOLUME, Some(self.volume.to_string())),
            (keys::INDEX, self.current_index.map(|index| index.to_string())),
            (keys::POSITION, Some(format!("{:.3}", self.position_secs))),
            (keys::PLAYING, Some(self.playing.to_string())),
            (keys::TAG, self.tag.clone()),
            (keys::SEARCH, self.search_term.clone()),
            (
                keys::SEARCH_HISTORY,
                Some(serde_json::to_string(&self.search_history)?),
            ),
            (keys::BROWSE_SORT, Some(self.browse_sort.as_str().to_string())),
            (keys::REPEAT, Some(serde_json::to_string(&self.repeat)?)),
        ];
        store.set_many(changes)
    }
}

/// Record `term` at the front of `history`, de-duplicated and capped
pub fn push_search_history(history: &mut Vec<String>, term: &str) {
    let term = term.trim();
    if term.is_empty() {
        return;
    }
    history.retain(|existing| existing != term);
    history.insert(0, term.to_string());
    history.truncate(SEARCH_HISTORY_LIMIT);
}
