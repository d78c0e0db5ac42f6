//! Application settings persistence
//!
//! Handles saving and loading user preferences. Every field has a default so
//! partially written or older settings files still load.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::DEFAULT_BASE_URL;

const SETTINGS_FILE: &str = "settings.json";
const STATE_FILE: &str = "state.json";

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Catalog API settings
    pub api: ApiSettings,
    /// Lyric scroll timing
    pub lyrics: LyricsSettings,
    /// Playback behaviour
    pub playback: PlaybackSettings,
    /// Storage locations
    pub storage: StorageSettings,
}

/// Catalog API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL, endpoints are appended (`/music`, `/update`)
    pub base_url: String,
    /// Timeout for catalog and lyric requests
    pub request_timeout_secs: u64,
    /// Media URL probe timeout; a probe that times out counts as valid
    pub probe_timeout_ms: u64,
}

/// Lyric scroll timing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LyricsSettings {
    /// Scroll events within this window after an automatic scroll are ignored
    pub auto_scroll_guard_ms: u64,
    /// Idle time after a manual scroll before auto-follow resumes
    pub user_scroll_idle_ms: u64,
}

/// Playback behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Recently played entries kept for shuffle "previous"
    pub history_limit: usize,
    /// Link refresh attempts per track within the cooldown window
    pub max_refresh_attempts: u32,
    /// Length of the refresh window
    pub refresh_cooldown_secs: u64,
    /// Periodic state save while playing
    pub save_interval_secs: u64,
    /// Volume change per step
    pub volume_step: f32,
    /// How often the runtime polls the media position
    pub position_poll_ms: u64,
}

/// Storage locations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Override for the persisted player state file
    pub state_file: Option<PathBuf>,
}

/// What happens when a track ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RepeatMode {
    /// Advance to the next track
    #[default]
    NoRepeat,
    /// Restart the current track
    RepeatOne,
    /// Wrap from the last track back to the first
    RepeatAll,
}

impl std::fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl RepeatMode {
    /// Get the next repeat mode in cycle order
    pub fn next(self) -> Self {
        match self {
            RepeatMode::NoRepeat => RepeatMode::RepeatOne,
            RepeatMode::RepeatOne => RepeatMode::RepeatAll,
            RepeatMode::RepeatAll => RepeatMode::NoRepeat,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            RepeatMode::NoRepeat => "no repeat",
            RepeatMode::RepeatOne => "repeat one",
            RepeatMode::RepeatAll => "repeat all",
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 15,
            probe_timeout_ms: 3000,
        }
    }
}

impl Default for LyricsSettings {
    fn default() -> Self {
        Self {
            auto_scroll_guard_ms: 500,
            user_scroll_idle_ms: 3000,
        }
    }
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            history_limit: 10,
            max_refresh_attempts: 3,
            refresh_cooldown_secs: 60,
            save_interval_secs: 300,
            volume_step: 0.05,
            position_poll_ms: 250,
        }
    }
}

impl ApiSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

impl LyricsSettings {
    pub fn auto_scroll_guard(&self) -> Duration {
        Duration::from_millis(self.auto_scroll_guard_ms)
    }

    pub fn user_scroll_idle(&self) -> Duration {
        Duration::from_millis(self.user_scroll_idle_ms)
    }
}

impl PlaybackSettings {
    pub fn refresh_cooldown(&self) -> Duration {
        Duration::from_secs(self.refresh_cooldown_secs)
    }

    pub fn save_interval(&self) -> Duration {
        Duration::from_secs(self.save_interval_secs.max(1))
    }

    pub fn position_poll(&self) -> Duration {
        Duration::from_millis(self.position_poll_ms.max(10))
    }
}

/// Settings file errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

impl Settings {
    /// Get settings file path
    pub fn file_path() -> Option<PathBuf> {
        crate::utils::config_dir().map(|dir| dir.join(SETTINGS_FILE))
    }

    /// Load settings from file, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = Self::file_path() else {
            return Self::default();
        };
        match Self::load_from_file(&path) {
            Ok(settings) => settings,
            Err(SettingsError::Io(_)) => Self::default(),
            Err(e) => {
                tracing::warn!("Ignoring unreadable settings at {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Load settings from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self, SettingsError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| SettingsError::Io(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| SettingsError::Parse(e.to_string()))
    }

    /// Save settings to the default file
    pub fn save(&self) -> Result<(), SettingsError> {
        if let Some(path) = Self::file_path() {
            self.save_to_file(&path)
        } else {
            Err(SettingsError::Io(
                "Could not determine config directory".to_string(),
            ))
        }
    }

    /// Save settings to a specific file
    pub fn save_to_file(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SettingsError::Io(e.to_string()))?;
        }

        let content =
            serde_json::to_string_pretty(self).map_err(|e| SettingsError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| SettingsError::Io(e.to_string()))?;
        Ok(())
    }

    /// Where player state is persisted
    pub fn state_file_path(&self) -> Option<PathBuf> {
        self.storage
            .state_file
            .clone()
            .or_else(|| crate::utils::data_dir().map(|dir| dir.join(STATE_FILE)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.api.probe_timeout(), Duration::from_secs(3));
        assert_eq!(settings.lyrics.auto_scroll_guard(), Duration::from_millis(500));
        assert_eq!(settings.lyrics.user_scroll_idle(), Duration::from_secs(3));
        assert_eq!(settings.playback.history_limit, 10);
        assert_eq!(settings.playback.max_refresh_attempts, 3);
        assert_eq!(settings.playback.refresh_cooldown(), Duration::from_secs(60));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"api":{"base_url":"http://localhost:8888/api"}}"#).unwrap();
        assert_eq!(settings.api.base_url, "http://localhost:8888/api");
        assert_eq!(settings.api.request_timeout_secs, 15);
        assert_eq!(settings.playback.save_interval_secs, 300);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE);
        let mut settings = Settings::default();
        settings.playback.volume_step = 0.1;
        settings.storage.state_file = Some(dir.path().join("s.json"));
        settings.save_to_file(&path).unwrap();

        let loaded = Settings::load_from_file(&path).unwrap();
        assert_eq!(loaded.playback.volume_step, 0.1);
        assert_eq!(loaded.state_file_path(), Some(dir.path().join("s.json")));
    }

    #[test]
    fn test_repeat_mode_cycle() {
        let mut mode = RepeatMode::default();
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(mode);
            mode = mode.next();
        }
        assert_eq!(
            seen,
            vec![RepeatMode::NoRepeat, RepeatMode::RepeatOne, RepeatMode::RepeatAll]
        );
        assert_eq!(mode, RepeatMode::NoRepeat);
        assert_eq!(
            serde_json::to_string(&RepeatMode::RepeatAll).unwrap(),
            "\"repeat_all\""
        );
    }

    #[test]
    fn test_corrupt_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            Settings::load_from_file(&path),
            Err(SettingsError::Parse(_))
        ));
    }
}
