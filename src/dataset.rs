//! Tabular file I/O: input songs, generic CSV tables and feature output.

use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use once_cell::sync::Lazy;
use rust_xlsxwriter::Workbook;
use rustc_hash::FxHashSet;
use std::path::Path;

use crate::models::{Cell, FeatureRow, InputRecord};

/// Cell values read as missing, matching the usual dataframe NA markers.
/// Matched exactly: whitespace-only or padded cells are values.
static NA_MARKERS: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    [
        "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "<NA>",
        "#N/A",
    ]
    .into_iter()
    .collect()
});

pub fn is_null(cell: &str) -> bool {
    NA_MARKERS.contains(cell)
}

// ============================================================================
// Generic Table
// ============================================================================

/// A CSV table held as strings. Null cells are empty or an NA marker.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value of `column` in row `row`, or `None` when the column is absent.
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx).map(String::as_str)
    }

    /// Number of null cells in `column`. A missing column counts as all null.
    pub fn null_count(&self, column: &str) -> usize {
        match self.column_index(column) {
            Some(idx) => self
                .rows
                .iter()
                .filter(|r| r.get(idx).map_or(true, |v| is_null(v)))
                .count(),
            None => self.rows.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn read_table(path: &Path) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let columns: Vec<String> = reader
        .headers()
        .with_context(|| format!("Failed to read header of {}", path.display()))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record =
            record.with_context(|| format!("Malformed row {} in {}", line + 1, path.display()))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Table { columns, rows })
}

pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

// ============================================================================
// Enrichment Input / Output
// ============================================================================

const REQUIRED_INPUT_COLUMNS: [&str; 2] = ["Artist", "Track"];

/// Read the `(Artist, Track)` pairs to enrich. Extra columns are ignored.
pub fn read_inputs(path: &Path) -> Result<Vec<InputRecord>> {
    let mut reader = ReaderBuilder::new()
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let headers = reader.headers()?.clone();
    for required in REQUIRED_INPUT_COLUMNS {
        if !headers.iter().any(|h| h == required) {
            bail!(
                "Input file '{}' is missing required column '{}'",
                path.display(),
                required
            );
        }
    }

    let mut inputs = Vec::new();
    for (line, record) in reader.deserialize::<InputRecord>().enumerate() {
        let record =
            record.with_context(|| format!("Malformed row {} in {}", line + 1, path.display()))?;
        inputs.push(record);
    }
    Ok(inputs)
}

/// Write feature rows as CSV. The header is written even for zero rows.
pub fn write_features_csv(path: &Path, rows: &[FeatureRow]) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record(FeatureRow::COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write feature rows as a single-sheet Excel workbook.
pub fn write_features_xlsx(path: &Path, rows: &[FeatureRow]) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, name) in FeatureRow::COLUMNS.iter().enumerate() {
        sheet.write_string(0, col as u16, *name)?;
    }
    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        for (col, cell) in row.cells().into_iter().enumerate() {
            let c = col as u16;
            match cell {
                Cell::Text(s) => sheet.write_string(r, c, s)?,
                Cell::Int(n) => sheet.write_number(r, c, n as f64)?,
                Cell::Float(x) => sheet.write_number(r, c, x)?,
            };
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to save {}", path.display()))?;
    Ok(())
}
