//! Core data models for Spotify feature enrichment.
//!
//! This module contains the input rows, the Spotify payload shapes and the
//! output feature row used throughout the enrichment pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder for missing categorical data.
pub const UNKNOWN: &str = "unknown";

// ============================================================================
// Input Models
// ============================================================================

/// One (artist, title) pair from the source table.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct InputRecord {
    #[serde(rename = "Artist")]
    pub artist: String,
    #[serde(rename = "Track")]
    pub title: String,
}

impl InputRecord {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
        }
    }
}

// ============================================================================
// Spotify Models
// ============================================================================

/// Best search match for a track (subset of the Web API track object).
#[derive(Clone, Debug, Deserialize)]
pub struct RemoteTrack {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub album: RemoteAlbum,
    pub popularity: u32,
    pub duration_ms: u64,
    pub explicit: bool,
    #[serde(default)]
    pub artists: Vec<RemoteArtistRef>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RemoteAlbum {
    pub name: String,
    pub release_date: Option<String>,
    pub release_date_precision: Option<String>,
    pub album_type: String,
    pub total_tracks: u32,
}

/// Simplified artist entry embedded in a track.
#[derive(Clone, Debug, Deserialize)]
pub struct RemoteArtistRef {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Full artist object, looked up by the primary artist id of a track.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RemoteArtist {
    /// `null` and absent both decode to `None`.
    #[serde(default)]
    pub genres: Option<Vec<String>>,
    pub popularity: Option<u32>,
    pub followers: Option<Followers>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Followers {
    pub total: Option<u64>,
}

// ============================================================================
// Output Models
// ============================================================================

/// Popularity band. Lower bounds are inclusive: 75, 50, 25.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PopularityCategory {
    High,
    Medium,
    Low,
    VeryLow,
}

impl PopularityCategory {
    pub fn from_popularity(popularity: u32) -> Self {
        match popularity {
            75.. => PopularityCategory::High,
            50..=74 => PopularityCategory::Medium,
            25..=49 => PopularityCategory::Low,
            _ => PopularityCategory::VeryLow,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PopularityCategory::High => "high",
            PopularityCategory::Medium => "medium",
            PopularityCategory::Low => "low",
            PopularityCategory::VeryLow => "very_low",
        }
    }
}

impl fmt::Display for PopularityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single spreadsheet cell, used when writing rows without serde.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Text(String),
    Int(i64),
    Float(f64),
}

/// Final enriched track for output.
///
/// Every column is always populated: failed sub-steps write their documented
/// defaults (`0`, `""`, `"unknown"`) instead of leaving a gap. Field order is
/// the output column order and must stay in sync with [`FeatureRow::COLUMNS`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FeatureRow {
    // Basic metadata
    pub track_name: String,
    pub artist_name: String,
    pub album_name: String,
    pub release_date: String,
    pub popularity: u32,
    pub duration_ms: u64,
    pub explicit: u8,

    // Album info
    pub album_type: String,
    pub total_tracks: u32,
    pub artists_count: u32,

    // Release date (0 / "unknown" when the date could not be parsed)
    pub release_year: i32,
    pub release_month: u32,
    pub years_since_release: i32,
    pub decade: String,

    // Primary artist ("" / "unknown" / 0 when the lookup failed)
    pub genres: String,
    pub primary_genre: String,
    pub artist_popularity: u32,
    pub artist_followers: u64,

    // Derived
    pub duration_minutes: f64,
    pub is_single: u8,
    pub popularity_category: PopularityCategory,
    pub is_collaboration: u8,
}

impl FeatureRow {
    pub const COLUMNS: [&'static str; 22] = [
        "track_name",
        "artist_name",
        "album_name",
        "release_date",
        "popularity",
        "duration_ms",
        "explicit",
        "album_type",
        "total_tracks",
        "artists_count",
        "release_year",
        "release_month",
        "years_since_release",
        "decade",
        "genres",
        "primary_genre",
        "artist_popularity",
        "artist_followers",
        "duration_minutes",
        "is_single",
        "popularity_category",
        "is_collaboration",
    ];

    /// Row values in [`FeatureRow::COLUMNS`] order.
    pub fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Text(self.track_name.clone()),
            Cell::Text(self.artist_name.clone()),
            Cell::Text(self.album_name.clone()),
            Cell::Text(self.release_date.clone()),
            Cell::Int(self.popularity as i64),
            Cell::Int(self.duration_ms as i64),
            Cell::Int(self.explicit as i64),
            Cell::Text(self.album_type.clone()),
            Cell::Int(self.total_tracks as i64),
            Cell::Int(self.artists_count as i64),
            Cell::Int(self.release_year as i64),
            Cell::Int(self.release_month as i64),
            Cell::Int(self.years_since_release as i64),
            Cell::Text(self.decade.clone()),
            Cell::Text(self.genres.clone()),
            Cell::Text(self.primary_genre.clone()),
            Cell::Int(self.artist_popularity as i64),
            Cell::Int(self.artist_followers as i64),
            Cell::Float(self.duration_minutes),
            Cell::Int(self.is_single as i64),
            Cell::Text(self.popularity_category.to_string()),
            Cell::Int(self.is_collaboration as i64),
        ]
    }
}

// ============================================================================
// Statistics (Instrumentation)
// ============================================================================

/// Counters for one enrichment run.
#[derive(Default, Debug, Clone, Serialize)]
pub struct EnrichStats {
    pub processed: usize,
    pub enriched: usize,
    pub not_found: usize,
    pub lookup_failed: usize,

    // Rows that were kept but carry fallback values
    pub date_fallbacks: usize,
    pub artist_fallbacks: usize,

    pub elapsed_seconds: f64,
}

impl EnrichStats {
    pub fn skipped(&self) -> usize {
        self.not_found + self.lookup_failed
    }

    /// Share of processed inputs that produced a row, as a percentage
    pub fn match_rate(&self) -> f64 {
        if self.processed == 0 {
            0.0
        } else {
            100.0 * self.enriched as f64 / self.processed as f64
        }
    }

    pub fn write_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
