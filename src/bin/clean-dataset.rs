//! Clean an enriched dataset: drop `all_artists`, fill missing `genres`.
//!
//! Usage: clean-dataset [input.csv] [output.csv]

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use spotify_features::cleaner::{clean, ALL_ARTISTS};
use spotify_features::dataset::{read_table, write_table, Table};
use spotify_features::progress::init_tracing;
use spotify_features::safety::validate_output_path;

#[derive(Parser)]
#[command(name = "clean-dataset")]
#[command(about = "Drop the redundant all_artists column and fill missing genres")]
struct Args {
    #[arg(default_value = "dataset_completo.csv")]
    input: PathBuf,

    #[arg(default_value = "dataset_completo_clean.csv")]
    output: PathBuf,
}

const PREVIEW_ROWS: usize = 5;

fn print_preview(table: &Table) {
    println!("\nFirst {} rows of the cleaned dataset:", PREVIEW_ROWS.min(table.len()));
    println!("{}", table.columns.join(" | "));
    for row in table.rows.iter().take(PREVIEW_ROWS) {
        println!("{}", row.join(" | "));
    }
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    validate_output_path(&args.output, "clean", &[&args.input])?;

    info!("Loading dataset from {}", args.input.display());
    let table = read_table(&args.input).context("Failed to load dataset")?;
    println!(
        "Original dataset: {} rows, {} columns",
        table.len(),
        table.columns.len()
    );

    let (cleaned, report) = clean(table);

    if report.dropped_all_artists {
        println!("Removed redundant '{}' column", ALL_ARTISTS);
    }
    println!("Songs with missing genres: {}", report.null_genres_before);
    println!(
        "Songs with missing genres after correction: {}",
        report.null_genres_after
    );

    info!("Saving cleaned dataset to {}", args.output.display());
    write_table(&args.output, &cleaned).context("Failed to save cleaned dataset")?;

    println!(
        "Cleaned dataset: {} rows, {} columns",
        report.rows_after, report.columns_after
    );
    print_preview(&cleaned);

    Ok(())
}
