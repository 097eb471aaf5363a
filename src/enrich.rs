//! Sequential enrichment driver.
//!
//! Resolves each input in order, pausing between inputs, and keeps only the
//! rows that resolved. Skipped inputs are logged and counted, never retried.

use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::catalog::MusicCatalog;
use crate::features::{derive, Skip};
use crate::models::{EnrichStats, FeatureRow, InputRecord};
use crate::progress::{create_progress_bar, finish_progress_bar, log_progress};
use crate::throttle::Throttle;

/// Log-only progress interval, in inputs
const PROGRESS_LOG_INTERVAL: u64 = 25;

pub struct EnrichOptions {
    /// Minimum pause between successive inputs
    pub delay: Duration,
    /// Year used for `years_since_release`
    pub current_year: i32,
}

pub struct EnrichOutcome {
    pub rows: Vec<FeatureRow>,
    pub stats: EnrichStats,
}

pub fn run(inputs: &[InputRecord], catalog: &dyn MusicCatalog, options: &EnrichOptions) -> EnrichOutcome {
    let start = Instant::now();
    let total = inputs.len() as u64;
    let pb = create_progress_bar(total, "Enriching songs");

    let mut throttle = Throttle::new(options.delay);
    let mut rows = Vec::with_capacity(inputs.len());
    let mut stats = EnrichStats::default();

    for (idx, input) in inputs.iter().enumerate() {
        throttle.wait();
        stats.processed += 1;

        match derive(input, catalog, options.current_year) {
            Ok(derived) => {
                if derived.date_fallback {
                    stats.date_fallbacks += 1;
                }
                if derived.artist_fallback {
                    stats.artist_fallbacks += 1;
                }
                rows.push(derived.row);
                stats.enriched += 1;
            }
            Err(Skip::NotFound) => {
                stats.not_found += 1;
                warn!(artist = %input.artist, title = %input.title, "Not found");
            }
            Err(Skip::LookupFailed(e)) => {
                stats.lookup_failed += 1;
                warn!(artist = %input.artist, title = %input.title, error = %e, "Lookup failed");
            }
        }

        pb.inc(1);
        log_progress("enrich", idx as u64 + 1, total, PROGRESS_LOG_INTERVAL);
    }

    stats.elapsed_seconds = start.elapsed().as_secs_f64();
    finish_progress_bar(
        &pb,
        format!("Enriched {}/{} songs", stats.enriched, stats.processed),
    );
    info!(
        enriched = stats.enriched,
        not_found = stats.not_found,
        lookup_failed = stats.lookup_failed,
        "Enrichment finished"
    );

    EnrichOutcome { rows, stats }
}
