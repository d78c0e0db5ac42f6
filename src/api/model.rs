//! Catalog data model
//!
//! Track records arrive from loosely typed JSON (catalog responses, local
//! playlist files, single-track parameters), so every field except the
//! title/url pair is optional and display code goes through the accessors
//! below instead of reading fields directly.

use anyhow::Context;
use serde::{Deserialize, Deserializer, Serialize};

/// Display fallback for tracks without a title
pub const UNKNOWN_TITLE: &str = "Unknown title";
/// Display fallback for tracks without an artist
pub const UNKNOWN_ARTIST: &str = "Unknown artist";

/// A playable track
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Track {
    /// Catalog identifier (string or number in the source JSON)
    #[serde(
        default,
        deserialize_with = "deserialize_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    /// Track title
    #[serde(default)]
    pub title: String,
    /// Performing artist
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    /// Media resource URL
    #[serde(default)]
    pub url: String,
    /// Lyric document URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lrc: Option<String>,
    /// Free-form tags used by browse filtering
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Text(String),
    Integer(i64),
    Float(f64),
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<IdRepr>::deserialize(deserializer)?;
    Ok(raw.and_then(|id| match id {
        IdRepr::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                None
            } else {
                Some(text.to_string())
            }
        }
        IdRepr::Integer(n) => Some(n.to_string()),
        IdRepr::Float(f) => Some(f.to_string()),
    }))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl Track {
    /// Build a single-track entry from explicit parameters
    pub fn single(title: &str, url: &str, artist: Option<&str>, lrc: Option<&str>) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            artist: non_empty(artist).map(str::to_string),
            url: url.to_string(),
            lrc: non_empty(lrc).map(str::to_string),
            tags: Vec::new(),
        }
    }

    /// Title for display, falling back to a placeholder
    pub fn display_title(&self) -> &str {
        non_empty(Some(&self.title)).unwrap_or(UNKNOWN_TITLE)
    }

    /// Artist for display, falling back to a placeholder
    pub fn display_artist(&self) -> &str {
        non_empty(self.artist.as_deref()).unwrap_or(UNKNOWN_ARTIST)
    }

    /// Lyric URL if the track carries a usable one
    pub fn lyric_url(&self) -> Option<&str> {
        non_empty(self.lrc.as_deref())
    }

    /// Whether the track has a media URL at all
    pub fn has_media(&self) -> bool {
        !self.url.trim().is_empty()
    }

    /// Key used for per-track retry bookkeeping: id, else title
    pub fn retry_key(&self) -> String {
        match non_empty(self.id.as_deref()) {
            Some(id) => id.to_string(),
            None => self.title.clone(),
        }
    }

    /// Whether `other` is the same catalog entry (same id, or same title ignoring case)
    pub fn same_entry(&self, other: &Track) -> bool {
        if let (Some(a), Some(b)) = (self.id.as_deref(), other.id.as_deref()) {
            if a == b {
                return true;
            }
        }
        !self.title.is_empty() && self.title.to_lowercase() == other.title.to_lowercase()
    }
}

/// Which link of a track is broken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Lrc,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::Lrc => write!(f, "lrc"),
        }
    }
}

/// `GET /music` response body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SongsResponse {
    #[serde(default)]
    pub songs: Vec<Track>,
}

/// `POST /update` request body
#[derive(Debug, Clone, Serialize)]
pub struct UpdateRequest<'a> {
    #[serde(rename = "songId")]
    pub song_id: &'a str,
    #[serde(rename = "errorType")]
    pub error_type: MediaKind,
    pub url: &'a str,
}

/// `POST /update` response body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(rename = "updatedUrl", default)]
    pub updated_url: Option<String>,
}

/// Local JSON playlist file: `{ "name": ..., "songs": [...] }`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaylistFile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub songs: Vec<Track>,
}

impl PlaylistFile {
    /// Parse a playlist document; an empty song list is an error
    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let file: PlaylistFile =
            serde_json::from_str(content).context("Failed to parse playlist JSON")?;
        if file.songs.is_empty() {
            anyhow::bail!("Playlist is empty");
        }
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_and_string_ids() {
        let json = r#"{"songs":[{"id":1,"title":"A","url":"u1"},{"id":"x2","title":"B","url":"u2"},{"title":"C","url":"u3","id":null}]}"#;
        let resp: SongsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.songs[0].id.as_deref(), Some("1"));
        assert_eq!(resp.songs[1].id.as_deref(), Some("x2"));
        assert_eq!(resp.songs[2].id, None);
    }

    #[test]
    fn test_display_defaults() {
        let track: Track = serde_json::from_str(r#"{"url":"u"}"#).unwrap();
        assert_eq!(track.display_title(), UNKNOWN_TITLE);
        assert_eq!(track.display_artist(), UNKNOWN_ARTIST);
        assert_eq!(track.lyric_url(), None);
        assert!(track.tags.is_empty());
    }

    #[test]
    fn test_empty_lrc_is_absent() {
        let track = Track::single("Song", "u", Some(""), Some("  "));
        assert_eq!(track.artist, None);
        assert_eq!(track.lyric_url(), None);
    }

    #[test]
    fn test_retry_key_prefers_id() {
        let mut track = Track::single("Song", "u", None, None);
        assert_eq!(track.retry_key(), "Song");
        track.id = Some("42".into());
        assert_eq!(track.retry_key(), "42");
    }

    #[test]
    fn test_same_entry() {
        let a = Track {
            id: Some("1".into()),
            title: "Hello".into(),
            ..Default::default()
        };
        let b = Track {
            id: Some("2".into()),
            title: "HELLO".into(),
            ..Default::default()
        };
        let c = Track {
            id: Some("1".into()),
            title: "Other".into(),
            ..Default::default()
        };
        assert!(a.same_entry(&b));
        assert!(a.same_entry(&c));
        assert!(!b.same_entry(&c));
    }

    #[test]
    fn test_update_request_shape() {
        let body = UpdateRequest {
            song_id: "7",
            error_type: MediaKind::Lrc,
            url: "http://x/a.lrc",
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["songId"], "7");
        assert_eq!(value["errorType"], "lrc");
        assert_eq!(value["url"], "http://x/a.lrc");
    }

    #[test]
    fn test_playlist_file() {
        let file = PlaylistFile::from_json(r#"{"name":"Mix","songs":[{"title":"A","url":"u"}]}"#)
            .unwrap();
        assert_eq!(file.name.as_deref(), Some("Mix"));
        assert!(PlaylistFile::from_json(r#"{"songs":[]}"#).is_err());
        assert!(PlaylistFile::from_json("not json").is_err());
    }
}
