//! Collaborator traits the player core depends on
//!
//! The player never talks HTTP directly. Every external request goes through
//! one of these traits so front ends and tests can substitute their own
//! implementations.

use std::sync::Arc;

use async_trait::async_trait;

use super::client::CatalogClient;
use super::error::ApiResult;
use super::model::{MediaKind, Track};

/// Song listing and search
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Fetch the catalog, optionally restricted to a tag
    async fn fetch_songs(&self, tag: Option<&str>) -> ApiResult<Vec<Track>>;

    /// Full-text search over the catalog
    async fn search(&self, query: &str) -> ApiResult<Vec<Track>>;
}

/// Replacement of expired media or lyric links
#[async_trait]
pub trait LinkRefresher: Send + Sync {
    /// Ask for a fresh link of the given kind; `None` means no replacement
    async fn refresh(&self, track: &Track, kind: MediaKind) -> Option<String>;
}

/// Lyric document retrieval
#[async_trait]
pub trait LyricSource: Send + Sync {
    /// Fetch the raw LRC text behind `url`
    async fn fetch(&self, url: &str) -> ApiResult<String>;
}

/// Result of a lightweight reachability check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Valid,
    Invalid,
    /// No answer within the probe timeout
    TimedOut,
}

impl ProbeOutcome {
    /// A timed out probe is treated as valid
    pub fn is_usable(self) -> bool {
        !matches!(self, ProbeOutcome::Invalid)
    }
}

/// Media URL reachability check
#[async_trait]
pub trait UrlProbe: Send + Sync {
    async fn probe(&self, url: &str) -> ProbeOutcome;
}

/// Bundle of collaborator handles shared with spawned tasks
#[derive(Clone)]
pub struct Services {
    pub catalog: Arc<dyn Catalog>,
    pub refresher: Arc<dyn LinkRefresher>,
    pub lyrics: Arc<dyn LyricSource>,
    pub probe: Arc<dyn UrlProbe>,
}

impl Services {
    /// Use one HTTP client for every collaborator
    pub fn from_client(client: Arc<CatalogClient>) -> Self {
        Self {
            catalog: client.clone(),
            refresher: client.clone(),
            lyrics: client.clone(),
            probe: client,
        }
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_counts_as_usable() {
        assert!(ProbeOutcome::Valid.is_usable());
        assert!(ProbeOutcome::TimedOut.is_usable());
        assert!(!ProbeOutcome::Invalid.is_usable());
    }
}
