//! Catalog HTTP client
//!
//! Talks to the serverless music catalog: song listing (`GET /music`), link
//! refresh (`POST /update`), lyric documents and media URL probing.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{debug, warn};

use super::error::{ApiError, ApiResult};
use super::model::{MediaKind, SongsResponse, Track, UpdateRequest, UpdateResponse};
use super::service::{Catalog, LinkRefresher, LyricSource, ProbeOutcome, UrlProbe};

/// Default catalog endpoint
pub const DEFAULT_BASE_URL: &str = "https://notion-music-api.netlify.app/api";

/// HTTP client for the catalog service
#[derive(Clone)]
pub struct CatalogClient {
    http: Client,
    base_url: String,
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl CatalogClient {
    /// Create a client for `base_url` (without the trailing endpoint name)
    pub fn new(base_url: &str, request_timeout: Duration) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(request_timeout)
            .gzip(true)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }

    async fn get_songs(&self, query: &[(&str, &str)]) -> ApiResult<Vec<Track>> {
        let url = self.endpoint("music");
        debug!("Catalog request: {} {:?}", url, query);

        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        let body: SongsResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        if body.songs.is_empty() {
            return Err(ApiError::EmptyResult);
        }
        Ok(body.songs)
    }

    /// Ask the update endpoint for a replacement link
    async fn request_update(&self, track: &Track, kind: MediaKind) -> ApiResult<String> {
        let Some(song_id) = track.id.as_deref() else {
            return Err(ApiError::Rejected("track has no id".into()));
        };
        let broken = match kind {
            MediaKind::Audio => track.url.as_str(),
            MediaKind::Lrc => track.lyric_url().unwrap_or_default(),
        };
        let body = UpdateRequest {
            song_id,
            error_type: kind,
            url: broken,
        };

        let response = self
            .http
            .post(self.endpoint("update"))
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        let result: UpdateResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        match result.updated_url {
            Some(url) if result.success && !url.is_empty() => Ok(url),
            _ => Err(ApiError::Rejected(format!(
                "no {} replacement for {}",
                kind,
                track.display_title()
            ))),
        }
    }

    /// Look the track up again through search and take its current link
    async fn rediscover(&self, track: &Track, kind: MediaKind) -> Option<String> {
        if track.title.trim().is_empty() {
            return None;
        }
        let songs = match self.search(&track.title).await {
            Ok(songs) => songs,
            Err(e) => {
                debug!("Rediscovery search failed for {}: {}", track.title, e);
                return None;
            }
        };
        let found = songs.iter().find(|candidate| candidate.same_entry(track))?;
        match kind {
            MediaKind::Audio if found.has_media() => Some(found.url.clone()),
            MediaKind::Lrc => found.lyric_url().map(str::to_string),
            _ => None,
        }
    }
}

/// Replace (or add) the `t` query parameter with the current time in millis.
/// Only URLs that already carry a query string are rewritten.
pub fn cache_bust(url: &str, now_millis: i64) -> Option<String> {
    if !url.contains('?') {
        return None;
    }
    let mut parsed = Url::parse(url).ok()?;
    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| key != "t")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    {
        let mut pairs = parsed.query_pairs_mut();
        pairs.clear();
        for (key, value) in &kept {
            pairs.append_pair(key, value);
        }
        pairs.append_pair("t", &now_millis.to_string());
    }
    Some(parsed.to_string())
}

#[async_trait]
impl Catalog for CatalogClient {
    async fn fetch_songs(&self, tag: Option<&str>) -> ApiResult<Vec<Track>> {
        match tag.map(str::trim).filter(|t| !t.is_empty()) {
            Some(tag) => self.get_songs(&[("tag", tag)]).await,
            None => self.get_songs(&[]).await,
        }
    }

    async fn search(&self, query: &str) -> ApiResult<Vec<Track>> {
        self.get_songs(&[("search", query)]).await
    }
}

#[async_trait]
impl LinkRefresher for CatalogClient {
    async fn refresh(&self, track: &Track, kind: MediaKind) -> Option<String> {
        match self.request_update(track, kind).await {
            Ok(url) => {
                debug!("Refreshed {} link for {}", kind, track.display_title());
                return Some(url);
            }
            Err(e) => warn!("Update endpoint failed for {}: {}", track.display_title(), e),
        }

        if let Some(url) = self.rediscover(track, kind).await {
            debug!("Rediscovered {} link for {}", kind, track.display_title());
            return Some(url);
        }

        if kind == MediaKind::Audio {
            let busted = cache_bust(&track.url, chrono::Utc::now().timestamp_millis());
            if busted.is_some() {
                debug!("Cache-busting audio link for {}", track.display_title());
            }
            return busted;
        }
        None
    }
}

#[async_trait]
impl LyricSource for CatalogClient {
    async fn fetch(&self, url: &str) -> ApiResult<String> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl UrlProbe for CatalogClient {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        match self.http.head(url).send().await {
            Ok(response) if response.status().is_success() => ProbeOutcome::Valid,
            Ok(response) => {
                debug!("Probe of {} answered {}", url, response.status());
                ProbeOutcome::Invalid
            }
            Err(e) if e.is_timeout() => ProbeOutcome::TimedOut,
            Err(e) => {
                debug!("Probe of {} failed: {}", url, e);
                ProbeOutcome::Invalid
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_bust_requires_query() {
        assert_eq!(cache_bust("https://cdn.example/a.mp3", 5), None);
    }

    #[test]
    fn test_cache_bust_replaces_timestamp() {
        let busted = cache_bust("https://cdn.example/a.mp3?sig=abc&t=1", 42).unwrap();
        assert_eq!(busted, "https://cdn.example/a.mp3?sig=abc&t=42");
    }

    #[test]
    fn test_endpoint_trims_slash() {
        let client = CatalogClient::new("http://localhost/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost/api");
        assert_eq!(client.endpoint("music"), "http://localhost/api/music");
    }
}
