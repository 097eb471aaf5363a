//! Per-track feature derivation.
//!
//! A feature row is built from one resolved track plus, at most, one artist
//! lookup. The release-date parse and the artist lookup are fault-isolated:
//! each produces its own `Result`, and a failure is replaced by documented
//! defaults instead of dropping the row. Only an unresolved track suppresses
//! output.

use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog::{CatalogError, MusicCatalog};
use crate::models::{
    FeatureRow, InputRecord, PopularityCategory, RemoteArtist, RemoteTrack, UNKNOWN,
};

// ============================================================================
// Release Date
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseDate {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReleaseDateError {
    #[error("release date or precision missing")]
    Missing,
    #[error("unsupported release date precision '{0}'")]
    UnsupportedPrecision(String),
    #[error("malformed release date '{0}'")]
    Malformed(String),
    #[error("release year {0} is out of range")]
    OutOfRange(i32),
}

/// Parse a Spotify release date according to its precision.
///
/// `day` and `month` precision read the first two `-` separated segments.
/// `year` precision has no month, so month defaults to 1.
pub fn parse_release_date(
    date: Option<&str>,
    precision: Option<&str>,
) -> Result<ReleaseDate, ReleaseDateError> {
    let (date, precision) = match (date, precision) {
        (Some(d), Some(p)) => (d, p),
        _ => return Err(ReleaseDateError::Missing),
    };
    let malformed = || ReleaseDateError::Malformed(date.to_string());

    match precision {
        "day" | "month" => {
            let mut parts = date.split('-');
            let year = parts
                .next()
                .and_then(|s| s.trim().parse::<i32>().ok())
                .ok_or_else(malformed)?;
            let month = parts
                .next()
                .and_then(|s| s.trim().parse::<u32>().ok())
                .ok_or_else(malformed)?;
            Ok(ReleaseDate { year, month })
        }
        "year" => {
            let year = date.trim().parse::<i32>().map_err(|_| malformed())?;
            Ok(ReleaseDate { year, month: 1 })
        }
        other => Err(ReleaseDateError::UnsupportedPrecision(other.to_string())),
    }
}

/// Decade label, e.g. 1987 -> "1980s".
pub fn decade_label(year: i32) -> String {
    format!("{}s", i64::from(year).div_euclid(10) * 10)
}

/// Release-date columns of a feature row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseFeatures {
    pub release_year: i32,
    pub release_month: u32,
    pub years_since_release: i32,
    pub decade: String,
}

impl ReleaseFeatures {
    pub fn from_date(date: ReleaseDate, current_year: i32) -> Result<Self, ReleaseDateError> {
        let years_since_release = current_year
            .checked_sub(date.year)
            .ok_or(ReleaseDateError::OutOfRange(date.year))?;
        Ok(Self {
            release_year: date.year,
            release_month: date.month,
            years_since_release,
            decade: decade_label(date.year),
        })
    }

    /// Defaults used when the date could not be parsed.
    pub fn unknown() -> Self {
        Self {
            release_year: 0,
            release_month: 0,
            years_since_release: 0,
            decade: UNKNOWN.to_string(),
        }
    }
}

// ============================================================================
// Primary Artist
// ============================================================================

/// Artist columns of a feature row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistProfile {
    pub genres: String,
    pub primary_genre: String,
    pub popularity: u32,
    pub followers: u64,
}

impl ArtistProfile {
    pub fn from_artist(artist: &RemoteArtist) -> Self {
        let genres = artist.genres.as_deref().unwrap_or_default();
        Self {
            genres: genres.join(","),
            primary_genre: genres
                .first()
                .cloned()
                .unwrap_or_else(|| UNKNOWN.to_string()),
            popularity: artist.popularity.unwrap_or(0),
            followers: artist
                .followers
                .as_ref()
                .and_then(|f| f.total)
                .unwrap_or(0),
        }
    }

    /// Defaults used when the artist lookup failed.
    pub fn unknown() -> Self {
        Self {
            genres: String::new(),
            primary_genre: UNKNOWN.to_string(),
            popularity: 0,
            followers: 0,
        }
    }
}

/// Look up the first credited artist of `track`.
pub fn lookup_primary_artist(
    catalog: &dyn MusicCatalog,
    track: &RemoteTrack,
) -> Result<RemoteArtist, CatalogError> {
    let primary = track
        .artists
        .first()
        .ok_or_else(|| CatalogError::NotFound(format!("track {} lists no artists", track.id)))?;
    catalog.artist(&primary.id)
}

// ============================================================================
// Derived Features
// ============================================================================

/// Duration in minutes rounded to two decimals.
///
/// Rounds the exact binary value of the quotient (half to even), so
/// 900 ms is 0.01 rather than 0.02.
pub fn duration_minutes(duration_ms: u64) -> f64 {
    format!("{:.2}", duration_ms as f64 / 60_000.0)
        .parse()
        .unwrap_or_default()
}

pub fn is_single(album_type: &str) -> u8 {
    u8::from(album_type == "single")
}

pub fn is_collaboration(artists_count: u32) -> u8 {
    u8::from(artists_count > 1)
}

// ============================================================================
// Row Assembly
// ============================================================================

/// Why an input produced no row.
#[derive(Debug)]
pub enum Skip {
    /// The search returned no match
    NotFound,
    /// The search itself failed (transport, status or payload error)
    LookupFailed(CatalogError),
}

/// A derived row plus which sub-steps fell back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Derivation {
    pub row: FeatureRow,
    pub date_fallback: bool,
    pub artist_fallback: bool,
}

/// Assemble a row from a resolved track and the outcomes of the two
/// fault-isolated sub-steps. Never fails.
pub fn build_row(
    input: &InputRecord,
    track: &RemoteTrack,
    release: Result<ReleaseDate, ReleaseDateError>,
    artist: Result<RemoteArtist, CatalogError>,
    current_year: i32,
) -> Derivation {
    let release = release.and_then(|date| ReleaseFeatures::from_date(date, current_year));
    let date_fallback = release.is_err();
    let release = match release {
        Ok(features) => features,
        Err(e) => {
            warn!(artist = %input.artist, title = %input.title, error = %e, "Using default release date features");
            ReleaseFeatures::unknown()
        }
    };

    let artist_fallback = artist.is_err();
    let profile = match artist {
        Ok(a) => ArtistProfile::from_artist(&a),
        Err(e) => {
            warn!(artist = %input.artist, title = %input.title, error = %e, "Using default artist features");
            ArtistProfile::unknown()
        }
    };

    let album = &track.album;
    let artists_count = track.artists.len() as u32;

    let row = FeatureRow {
        track_name: input.title.clone(),
        artist_name: input.artist.clone(),
        album_name: album.name.clone(),
        release_date: album.release_date.clone().unwrap_or_default(),
        popularity: track.popularity,
        duration_ms: track.duration_ms,
        explicit: u8::from(track.explicit),

        album_type: album.album_type.clone(),
        total_tracks: album.total_tracks,
        artists_count,

        release_year: release.release_year,
        release_month: release.release_month,
        years_since_release: release.years_since_release,
        decade: release.decade,

        genres: profile.genres,
        primary_genre: profile.primary_genre,
        artist_popularity: profile.popularity,
        artist_followers: profile.followers,

        duration_minutes: duration_minutes(track.duration_ms),
        is_single: is_single(&album.album_type),
        popularity_category: PopularityCategory::from_popularity(track.popularity),
        is_collaboration: is_collaboration(artists_count),
    };

    Derivation {
        row,
        date_fallback,
        artist_fallback,
    }
}

/// Resolve `input` against the catalog and derive its feature row.
pub fn derive(
    input: &InputRecord,
    catalog: &dyn MusicCatalog,
    current_year: i32,
) -> Result<Derivation, Skip> {
    let track = match catalog.search_track(&input.artist, &input.title) {
        Ok(Some(track)) => track,
        Ok(None) => return Err(Skip::NotFound),
        Err(e) => return Err(Skip::LookupFailed(e)),
    };
    debug!(spotify_id = %track.id, name = %track.name, "Resolved track");

    let release = parse_release_date(
        track.album.release_date.as_deref(),
        track.album.release_date_precision.as_deref(),
    );
    let artist = lookup_primary_artist(catalog, &track);

    Ok(build_row(input, &track, release, artist, current_year))
}
