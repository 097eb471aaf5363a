//! Spotify feature enrichment library - shared modules for both binaries.

pub mod catalog;
pub mod cleaner;
pub mod dataset;
pub mod enrich;
pub mod features;
pub mod models;
pub mod progress;
pub mod safety;
pub mod spotify;
pub mod summary;
pub mod throttle;
