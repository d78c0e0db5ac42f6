//! Playlist source, search and browse message handlers

use std::path::PathBuf;

use crate::api::{PlaylistFile, Track};
use crate::app::event::PlayerEvent;
use crate::app::message::{LoadedPlaylist, Message, PlaylistSource, StartupRequest};
use crate::app::state::{Player, RestorePoint};
use crate::app::task::Task;
use crate::audio::Slot;
use crate::features::storage::push_search_history;

impl Player {
    fn next_playlist_request(&mut self) -> u64 {
        self.library.playlist_request = self.library.playlist_request.wrapping_add(1);
        self.library.playlist_request
    }

    /// Pick the first playlist: search, tag, single track, file, then the
    /// saved tag/search, then the full catalog
    fn startup(&mut self, request: &StartupRequest) -> Task<Message> {
        if request.shuffle {
            self.playback.selection.shuffle = true;
        }
        self.emit(PlayerEvent::ShuffleChanged(self.playback.selection.shuffle));
        self.emit(PlayerEvent::RepeatChanged(self.playback.repeat));
        self.emit(PlayerEvent::VolumeChanged {
            volume: self.playback.volume,
            muted: self.is_muted(),
        });
        self.emit(PlayerEvent::SearchHistory(
            self.library.search_history.clone(),
        ));

        let search = request
            .search
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty());
        let tag = request
            .tag
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());

        if let Some(query) = search {
            tracing::info!("Startup: search \"{}\"", query);
            return self.request_search(query.to_string(), true);
        }
        if let Some(tag) = tag {
            tracing::info!("Startup: tag \"{}\"", tag);
            return self.request_catalog(Some(tag.to_string()), true);
        }
        if let Some(track) = &request.single {
            tracing::info!("Startup: single track \"{}\"", track.display_title());
            return self.load_single(track.clone());
        }
        if let Some(path) = &request.playlist_file {
            tracing::info!("Startup: playlist file {:?}", path);
            return self.request_file(path.clone());
        }

        if let Some(tag) = self.library.active_tag.clone() {
            tracing::info!("Restoring last tag \"{}\"", tag);
            return self.request_catalog(Some(tag), true);
        }
        if let Some(query) = self.library.active_search.clone() {
            tracing::info!("Restoring last search \"{}\"", query);
            return self.request_search(query, true);
        }
        self.request_catalog(None, true)
    }

    fn request_catalog(&mut self, tag: Option<String>, restore: bool) -> Task<Message> {
        let request = self.next_playlist_request();
        let catalog = self.core.services.catalog.clone();
        let source = PlaylistSource::Catalog { tag: tag.clone() };
        Task::perform(
            async move { catalog.fetch_songs(tag.as_deref()).await },
            move |result| Message::PlaylistFetched {
                request,
                source,
                restore,
                result: result
                    .map(|songs| LoadedPlaylist { name: None, songs })
                    .map_err(|e| e.to_string()),
            },
        )
    }

    fn request_search(&mut self, query: String, fallback: bool) -> Task<Message> {
        let request = self.next_playlist_request();
        let catalog = self.core.services.catalog.clone();
        let source = PlaylistSource::Search {
            query: query.clone(),
            fallback,
        };
        Task::perform(
            async move { catalog.search(&query).await },
            move |result| Message::PlaylistFetched {
                request,
                source,
                restore: false,
                result: result
                    .map(|songs| LoadedPlaylist { name: None, songs })
                    .map_err(|e| e.to_string()),
            },
        )
    }

    fn request_file(&mut self, path: PathBuf) -> Task<Message> {
        let request = self.next_playlist_request();
        let source = PlaylistSource::File(path.clone());
        Task::perform(read_playlist_file(path), move |result| {
            Message::PlaylistFetched {
                request,
                source,
                restore: false,
                result,
            }
        })
    }

    fn load_single(&mut self, track: Track) -> Task<Message> {
        // Supersede any playlist request still in flight
        self.next_playlist_request();
        let name = track.artist.clone();
        self.apply_playlist(
            PlaylistSource::Single,
            LoadedPlaylist {
                name,
                songs: vec![track],
            },
            None,
        )
    }

    /// Replace the playlist and reset everything tied to the old one
    fn install_playlist(&mut self, name: Option<String>, songs: Vec<Track>) {
        let len = songs.len();
        tracing::info!("Installing playlist {:?} with {} tracks", name, len);

        self.library.playlist = songs;
        self.library.playlist_name = name.clone();

        self.playback.preload.reset();
        self.core.media.clear(Slot::Next);
        self.core.media.clear(Slot::Prev);
        self.playback.retry.clear();
        self.playback.abandoned = 0;
        self.playback.loaded = false;
        self.playback.selection.reset_for_playlist();

        self.emit(PlayerEvent::PlaylistLoaded { name, len });
    }

    /// Install a fetched playlist and start playback at `start` (or the first track)
    fn apply_playlist(
        &mut self,
        source: PlaylistSource,
        loaded: LoadedPlaylist,
        start: Option<RestorePoint>,
    ) -> Task<Message> {
        let count = loaded.songs.len();
        let name = loaded.name.or_else(|| default_playlist_name(&source));

        match &source {
            PlaylistSource::Catalog { tag } => {
                self.library.active_tag = tag.clone();
                self.library.active_search = None;
            }
            PlaylistSource::Search { query, .. } => {
                self.library.active_search = Some(query.clone());
                self.library.active_tag = None;
                push_search_history(&mut self.library.search_history, query);
                self.emit(PlayerEvent::SearchResults {
                    query: query.clone(),
                    count,
                });
                self.emit(PlayerEvent::SearchHistory(
                    self.library.search_history.clone(),
                ));
            }
            PlaylistSource::File(_) | PlaylistSource::Single | PlaylistSource::Browse => {}
        }

        self.install_playlist(name, loaded.songs);

        let start = start.filter(|point| point.index < count);
        let (index, position, autoplay) = match start {
            Some(point) => {
                tracing::info!(
                    "Starting at index {} ({:.1}s, playing: {})",
                    point.index,
                    point.position,
                    point.playing
                );
                (point.index, point.position, point.playing)
            }
            // Search results are shown, not played
            None => (0, 0.0, !matches!(source, PlaylistSource::Search { .. })),
        };
        self.load_song(index, autoplay, position)
    }

    fn emit_browse_list(&self) {
        let browse = &self.library.browse;
        self.emit(PlayerEvent::BrowseList {
            tags: browse.tags().to_vec(),
            active_tag: browse.active_tag().map(str::to_string),
            sort: browse.sort(),
            songs: browse.visible(),
        });
    }

    /// Handle library-related messages
    pub fn handle_library(&mut self, message: &Message) -> Option<Task<Message>> {
        match message {
            Message::Startup(request) => Some(self.startup(request)),

            Message::LoadCatalog { tag } => Some(self.request_catalog(tag.clone(), false)),

            Message::LoadPlaylistFile(path) => Some(self.request_file(path.clone())),

            Message::LoadSingle(track) => Some(self.load_single(track.clone())),

            Message::Search(query) => {
                let query = query.trim();
                if query.is_empty() {
                    tracing::debug!("Ignoring empty search");
                    return Some(Task::none());
                }
                tracing::info!("Searching for \"{}\"", query);
                Some(self.request_search(query.to_string(), false))
            }

            Message::PlaylistFetched {
                request,
                source,
                restore,
                result,
            } => {
                if *request != self.library.playlist_request {
                    tracing::debug!("Discarding stale playlist result #{}", request);
                    return Some(Task::none());
                }

                let loaded = match result {
                    Ok(loaded) if !loaded.songs.is_empty() => loaded.clone(),
                    Ok(_) => return Some(self.playlist_failed(source, *restore, "no songs found")),
                    Err(error) => return Some(self.playlist_failed(source, *restore, error)),
                };

                let start = if *restore {
                    self.library.restore.take()
                } else {
                    None
                };
                Some(self.apply_playlist(source.clone(), loaded, start))
            }

            // ============ Browse ============
            Message::OpenBrowse => {
                if self.library.browse.is_loaded() {
                    self.emit_browse_list();
                    return Some(Task::none());
                }
                let catalog = self.core.services.catalog.clone();
                Some(Task::perform(
                    async move { catalog.fetch_songs(None).await },
                    |result| Message::BrowseLoaded(result.map_err(|e| e.to_string())),
                ))
            }

            Message::BrowseLoaded(result) => {
                match result {
                    Ok(songs) => {
                        tracing::info!("Browse catalog loaded: {} songs", songs.len());
                        self.library.browse.set_catalog(songs.clone());
                        self.emit_browse_list();
                    }
                    Err(error) => {
                        tracing::warn!("Failed to load browse catalog: {}", error);
                        self.emit(PlayerEvent::Error(format!(
                            "Failed to load catalog: {}",
                            error
                        )));
                    }
                }
                Some(Task::none())
            }

            Message::BrowseSelectTag(tag) => {
                self.library.browse.select_tag(tag.clone());
                self.emit_browse_list();
                Some(Task::none())
            }

            Message::BrowseSort(sort) => {
                self.library.browse.set_sort(*sort);
                self.emit_browse_list();
                self.persist();
                Some(Task::none())
            }

            Message::BrowseFilter(query) => {
                self.library.browse.set_query(query);
                self.emit_browse_list();
                Some(Task::none())
            }

            Message::BrowsePlay(index) => {
                let songs = self.library.browse.visible();
                if *index >= songs.len() {
                    tracing::warn!("Browse index {} out of range ({})", index, songs.len());
                    return Some(Task::none());
                }
                self.next_playlist_request();
                let name = self
                    .library
                    .browse
                    .active_tag()
                    .map(|tag| format!("Browse: {}", tag));
                let start = RestorePoint {
                    index: *index,
                    position: 0.0,
                    playing: true,
                };
                Some(self.apply_playlist(
                    PlaylistSource::Browse,
                    LoadedPlaylist { name, songs },
                    Some(start),
                ))
            }

            _ => None,
        }
    }

    /// A playlist request failed or came back empty
    fn playlist_failed(&mut self, source: &PlaylistSource, restore: bool, error: &str) -> Task<Message> {
        tracing::warn!("Playlist load failed ({:?}): {}", source, error);

        if let PlaylistSource::Search {
            query,
            fallback: true,
        } = source
        {
            self.emit(PlayerEvent::Error(format!(
                "No results for \"{}\", loading the full catalog",
                query
            )));
            self.library.active_search = None;
            return self.request_catalog(None, restore);
        }

        let message = match source {
            PlaylistSource::Search { query, .. } => {
                format!("Search for \"{}\" failed: {}", query, error)
            }
            _ => format!("Failed to load playlist: {}", error),
        };
        self.emit(PlayerEvent::Error(message));
        Task::none()
    }
}

async fn read_playlist_file(path: PathBuf) -> Result<LoadedPlaylist, String> {
    let content = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let file = PlaylistFile::from_json(&content).map_err(|e| format!("{:#}", e))?;
    Ok(LoadedPlaylist {
        name: file.name,
        songs: file.songs,
    })
}

fn default_playlist_name(source: &PlaylistSource) -> Option<String> {
    match source {
        PlaylistSource::Catalog { tag: Some(tag) } => Some(format!("Tag: {}", tag)),
        PlaylistSource::Catalog { tag: None } => Some("Catalog".to_string()),
        PlaylistSource::Search { query, .. } => Some(format!("Search: {}", query)),
        PlaylistSource::File(path) => path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned()),
        PlaylistSource::Single => Some("Single track".to_string()),
        PlaylistSource::Browse => Some("Browse".to_string()),
    }
}
