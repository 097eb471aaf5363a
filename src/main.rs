use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use clap::Parser;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use spotify_features::dataset::{read_inputs, write_features_csv, write_features_xlsx};
use spotify_features::enrich::{self, EnrichOptions};
use spotify_features::progress::{format_duration, init_tracing, set_log_only};
use spotify_features::safety::validate_output_path;
use spotify_features::spotify::{Credentials, SpotifyClient};
use spotify_features::summary::DatasetSummary;
use spotify_features::throttle::DEFAULT_INTERVAL;

#[derive(Parser)]
#[command(name = "enrich-dataset")]
#[command(about = "Build a track feature dataset from (Artist, Track) pairs using the Spotify Web API")]
struct Args {
    /// CSV with at least `Artist` and `Track` columns
    #[arg(default_value = "dataset.csv")]
    input: PathBuf,

    /// Output CSV; an .xlsx copy is written next to it
    #[arg(default_value = "enriched_spotify_dataset.csv")]
    output: PathBuf,

    #[arg(long, env = "SPOTIFY_CLIENT_ID", hide_env_values = true)]
    client_id: String,

    #[arg(long, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,

    /// Pause between successive songs, in milliseconds
    #[arg(long, default_value_t = DEFAULT_INTERVAL.as_millis() as u64)]
    delay_ms: u64,

    /// Skip the Excel copy
    #[arg(long)]
    no_xlsx: bool,

    /// Write run statistics as JSON to this path
    #[arg(long)]
    stats_json: Option<PathBuf>,

    /// Hide progress bars, log periodic progress lines instead
    #[arg(long)]
    log_only: bool,
}

const PREVIEW_ROWS: usize = 5;

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();
    set_log_only(args.log_only);

    validate_output_path(&args.output, "enriched", &[&args.input])?;

    let start = Instant::now();

    info!("Loading the original dataset from {}", args.input.display());
    let inputs = read_inputs(&args.input).context("Error loading the input file")?;
    info!("Loaded {} songs", inputs.len());
    println!("First {} rows:", PREVIEW_ROWS.min(inputs.len()));
    for input in inputs.iter().take(PREVIEW_ROWS) {
        println!("  {} - {}", input.artist, input.title);
    }

    let client = SpotifyClient::connect(Credentials {
        client_id: args.client_id,
        client_secret: args.client_secret,
    })
    .context("Failed to authenticate with Spotify")?;

    let options = EnrichOptions {
        delay: Duration::from_millis(args.delay_ms),
        current_year: Local::now().year(),
    };
    let outcome = enrich::run(&inputs, &client, &options);

    write_features_csv(&args.output, &outcome.rows)
        .context("Failed to write enriched dataset")?;
    info!("Saved {} rows to {}", outcome.rows.len(), args.output.display());

    if !args.no_xlsx {
        let xlsx_path = args.output.with_extension("xlsx");
        match write_features_xlsx(&xlsx_path, &outcome.rows) {
            Ok(()) => info!("Dataset also saved as Excel file {}", xlsx_path.display()),
            Err(e) => warn!("Could not save as Excel: {:#}", e),
        }
    }

    if let Some(path) = &args.stats_json {
        outcome
            .stats
            .write_to_file(path)
            .with_context(|| format!("Failed to write stats to {}", path.display()))?;
    }

    let summary = DatasetSummary::from_rows(&outcome.rows);
    let stats = &outcome.stats;

    println!("\n{:=<60}", "");
    println!("Enrichment complete!");
    println!("  Processed: {}", stats.processed);
    println!("  Enriched:  {} ({:.1}%)", stats.enriched, stats.match_rate());
    println!("  Not found: {}", stats.not_found);
    println!("  Failed:    {}", stats.lookup_failed);
    println!("  Skipped:   {}", stats.skipped());
    println!("  Date fallbacks:   {}", stats.date_fallbacks);
    println!("  Artist fallbacks: {}", stats.artist_fallbacks);
    println!("  Elapsed: {}", format_duration(start.elapsed()));
    println!("{:=<60}", "");
    println!("\n{}", summary.render());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_defaults_to_throttle_interval() {
        let args = Args::parse_from([
            "enrich-dataset",
            "--client-id",
            "id",
            "--client-secret",
            "secret",
        ]);
        assert_eq!(Duration::from_millis(args.delay_ms), DEFAULT_INTERVAL);
        assert_eq!(args.input, PathBuf::from("dataset.csv"));
    }

    #[test]
    fn test_delay_override() {
        let args = Args::parse_from([
            "enrich-dataset",
            "--client-id",
            "id",
            "--client-secret",
            "secret",
            "--delay-ms",
            "0",
        ]);
        assert_eq!(args.delay_ms, 0);
    }
}
