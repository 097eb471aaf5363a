//! Lookup seam between the feature pipeline and the remote catalog.

use thiserror::Error;

use crate::models::{RemoteArtist, RemoteTrack};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} for {endpoint}")]
    Status { endpoint: String, status: u16 },

    #[error("not found: {0}")]
    NotFound(String),
}

/// Remote track/artist lookups used to build feature rows.
pub trait MusicCatalog {
    /// Best match for `artist` + `title`, or `None` when the search is empty.
    fn search_track(&self, artist: &str, title: &str) -> Result<Option<RemoteTrack>, CatalogError>;

    fn artist(&self, id: &str) -> Result<RemoteArtist, CatalogError>;
}
