//! Catalog browser
//!
//! Holds a one-time snapshot of the full catalog and derives the visible
//! list from the active tag, the sort order and a free-text filter.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::api::Track;

use super::storage::SortOrder;

/// Browse panel state
#[derive(Debug, Clone, Default)]
pub struct BrowseState {
    catalog: Option<Vec<Track>>,
    tags: Vec<String>,
    active_tag: Option<String>,
    sort: SortOrder,
    query: String,
}

impl BrowseState {
    pub fn new(sort: SortOrder) -> Self {
        Self {
            sort,
            ..Default::default()
        }
    }

    /// Whether the catalog snapshot has been loaded
    pub fn is_loaded(&self) -> bool {
        self.catalog.is_some()
    }

    /// Install the catalog snapshot and rebuild the tag list
    pub fn set_catalog(&mut self, songs: Vec<Track>) {
        self.tags = extract_tags(&songs);
        if let Some(tag) = &self.active_tag {
            if !self.tags.contains(tag) {
                self.active_tag = None;
            }
        }
        self.catalog = Some(songs);
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn active_tag(&self) -> Option<&str> {
        self.active_tag.as_deref()
    }

    /// Select a tag, `None` for all songs
    pub fn select_tag(&mut self, tag: Option<String>) {
        self.active_tag = tag.filter(|t| !t.trim().is_empty());
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.sort = sort;
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.trim().to_string();
    }

    /// Songs matching the current tag and query, in the current order
    pub fn visible(&self) -> Vec<Track> {
        let Some(catalog) = &self.catalog else {
            return Vec::new();
        };
        let needle = self.query.to_lowercase();

        let mut songs: Vec<Track> = catalog
            .iter()
            .filter(|song| match &self.active_tag {
                Some(tag) => song.tags.iter().any(|t| t == tag),
                None => true,
            })
            .filter(|song| {
                needle.is_empty()
                    || song.title.to_lowercase().contains(&needle)
                    || song
                        .artist
                        .as_deref()
                        .is_some_and(|a| a.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();

        sort_songs(&mut songs, self.sort);
        songs
    }
}

/// Sorted distinct tags across `songs`
pub fn extract_tags(songs: &[Track]) -> Vec<String> {
    songs
        .iter()
        .flat_map(|song| song.tags.iter())
        .filter(|tag| !tag.trim().is_empty())
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn compare_ci(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Stable, case-insensitive sort by title or artist
pub fn sort_songs(songs: &mut [Track], order: SortOrder) {
    match order {
        SortOrder::TitleAsc => songs.sort_by(|a, b| compare_ci(&a.title, &b.title)),
        SortOrder::TitleDesc => songs.sort_by(|a, b| compare_ci(&b.title, &a.title)),
        SortOrder::ArtistAsc => songs.sort_by(|a, b| {
            compare_ci(
                a.artist.as_deref().unwrap_or_default(),
                b.artist.as_deref().unwrap_or_default(),
            )
        }),
        SortOrder::ArtistDesc => songs.sort_by(|a, b| {
            compare_ci(
                b.artist.as_deref().unwrap_or_default(),
                a.artist.as_deref().unwrap_or_default(),
            )
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(title: &str, artist: &str, tags: &[&str]) -> Track {
        Track {
            title: title.into(),
            artist: Some(artist.into()),
            url: format!("https://cdn/{}.mp3", title),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    fn catalog() -> Vec<Track> {
        vec![
            song("beta", "Zed", &["rock"]),
            song("Alpha", "amy", &["pop", "rock"]),
            song("gamma", "Bob", &["jazz"]),
        ]
    }

    fn titles(songs: &[Track]) -> Vec<&str> {
        songs.iter().map(|s| s.title.as_str()).collect()
    }

    #[test]
    fn test_unloaded_is_empty() {
        assert!(BrowseState::default().visible().is_empty());
    }

    #[test]
    fn test_tags_sorted_and_distinct() {
        assert_eq!(extract_tags(&catalog()), vec!["jazz", "pop", "rock"]);
    }

    #[test]
    fn test_sort_orders_case_insensitive() {
        let mut state = BrowseState::new(SortOrder::TitleAsc);
        state.set_catalog(catalog());
        assert_eq!(titles(&state.visible()), vec!["Alpha", "beta", "gamma"]);

        state.set_sort(SortOrder::TitleDesc);
        assert_eq!(titles(&state.visible()), vec!["gamma", "beta", "Alpha"]);

        state.set_sort(SortOrder::ArtistAsc);
        assert_eq!(titles(&state.visible()), vec!["Alpha", "gamma", "beta"]);

        state.set_sort(SortOrder::ArtistDesc);
        assert_eq!(titles(&state.visible()), vec!["beta", "gamma", "Alpha"]);
    }

    #[test]
    fn test_tag_filter_and_query() {
        let mut state = BrowseState::default();
        state.set_catalog(catalog());
        state.select_tag(Some("rock".into()));
        assert_eq!(titles(&state.visible()), vec!["Alpha", "beta"]);

        state.set_query("ZE");
        assert_eq!(titles(&state.visible()), vec!["beta"]);

        state.select_tag(None);
        state.set_query("  gam ");
        assert_eq!(titles(&state.visible()), vec!["gamma"]);
    }

    #[test]
    fn test_unknown_active_tag_dropped_on_reload() {
        let mut state = BrowseState::default();
        state.select_tag(Some("metal".into()));
        state.set_catalog(catalog());
        assert_eq!(state.active_tag(), None);
        assert_eq!(state.visible().len(), 3);
    }
}
