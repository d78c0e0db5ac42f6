//! Music catalog API module
//!
//! Provides the HTTP catalog client and the collaborator traits the player
//! core is written against (catalog listing, link refresh, lyric documents,
//! URL probing).

mod client;
mod error;
pub mod model;
mod service;

pub use client::{CatalogClient, DEFAULT_BASE_URL};
pub use error::{ApiError, ApiResult};
pub use model::{MediaKind, PlaylistFile, Track};
pub use service::{Catalog, LinkRefresher, LyricSource, ProbeOutcome, Services, UrlProbe};
