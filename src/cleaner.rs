//! Post-processing for enriched datasets.
//!
//! Drops the redundant `all_artists` column and fills missing `genres` from
//! `primary_genre`, falling back to `"unknown"`.

use serde::Serialize;

use crate::dataset::{is_null, Table};
use crate::models::UNKNOWN;

pub const GENRES: &str = "genres";
pub const PRIMARY_GENRE: &str = "primary_genre";
pub const ALL_ARTISTS: &str = "all_artists";

/// Before/after counts for one cleaning pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanReport {
    pub rows_before: usize,
    pub rows_after: usize,
    pub columns_before: usize,
    pub columns_after: usize,
    pub dropped_all_artists: bool,
    pub null_genres_before: usize,
    pub null_genres_after: usize,
}

/// Value `genres` should take for a row whose `genres` is null.
pub fn fallback_genre(primary_genre: Option<&str>) -> &str {
    match primary_genre {
        Some(g) if !is_null(g) && g != UNKNOWN => g,
        _ => UNKNOWN,
    }
}

/// Clean `table`, returning the new table and what changed.
///
/// Rows with a non-null `genres` are passed through untouched. A table with no
/// `genres` column gets one, filled by the same rule.
pub fn clean(table: Table) -> (Table, CleanReport) {
    let mut report = CleanReport {
        rows_before: table.len(),
        columns_before: table.columns.len(),
        null_genres_before: table.null_count(GENRES),
        ..Default::default()
    };

    let drop_idx = table.column_index(ALL_ARTISTS);
    report.dropped_all_artists = drop_idx.is_some();

    let genres_idx = table.column_index(GENRES);
    let primary_idx = table.column_index(PRIMARY_GENRE);

    let mut columns: Vec<String> = table
        .columns
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != drop_idx)
        .map(|(_, c)| c.clone())
        .collect();
    if genres_idx.is_none() {
        columns.push(GENRES.to_string());
    }

    let rows: Vec<Vec<String>> = table
        .rows
        .into_iter()
        .map(|row| {
            let genres = genres_idx.and_then(|i| row.get(i)).map(String::as_str);
            let filled = match genres {
                Some(g) if !is_null(g) => None,
                _ => {
                    let primary = primary_idx.and_then(|i| row.get(i)).map(String::as_str);
                    Some(fallback_genre(primary).to_string())
                }
            };

            let mut out: Vec<String> = Vec::with_capacity(columns.len());
            for (i, value) in row.into_iter().enumerate() {
                if Some(i) == drop_idx {
                    continue;
                }
                match (&filled, genres_idx) {
                    (Some(fill), Some(g)) if g == i => out.push(fill.clone()),
                    _ => out.push(value),
                }
            }
            if let (Some(fill), None) = (filled, genres_idx) {
                out.push(fill);
            }
            out
        })
        .collect();

    let cleaned = Table::new(columns, rows);
    report.rows_after = cleaned.len();
    report.columns_after = cleaned.columns.len();
    report.null_genres_after = cleaned.null_count(GENRES);

    (cleaned, report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
        Table::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|v| v.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_fallback_genre() {
        assert_eq!(fallback_genre(Some("reggaeton")), "reggaeton");
        assert_eq!(fallback_genre(Some("unknown")), "unknown");
        assert_eq!(fallback_genre(Some("")), "unknown");
        assert_eq!(fallback_genre(Some("NaN")), "unknown");
        assert_eq!(fallback_genre(None), "unknown");
    }

    #[test]
    fn test_clean_fills_and_drops() {
        let input = table(
            &["track_name", "genres", "primary_genre", "all_artists"],
            &[
                &["a", "pop,latin pop", "pop", "X"],
                &["b", "", "cumbia", "Y"],
                &["c", "", "unknown", "Z"],
                &["d", "NaN", "", "W"],
            ],
        );

        let (cleaned, report) = clean(input);

        assert_eq!(cleaned.columns, vec!["track_name", "genres", "primary_genre"]);
        assert_eq!(cleaned.get(0, "genres"), Some("pop,latin pop"));
        assert_eq!(cleaned.get(1, "genres"), Some("cumbia"));
        assert_eq!(cleaned.get(2, "genres"), Some("unknown"));
        assert_eq!(cleaned.get(3, "genres"), Some("unknown"));
        // primary_genre itself is not touched
        assert_eq!(cleaned.get(3, "primary_genre"), Some(""));

        assert_eq!(
            report,
            CleanReport {
                rows_before: 4,
                rows_after: 4,
                columns_before: 4,
                columns_after: 3,
                dropped_all_artists: true,
                null_genres_before: 3,
                null_genres_after: 0,
            }
        );
    }

    #[test]
    fn test_clean_is_noop_without_work() {
        let input = table(
            &["genres", "primary_genre"],
            &[&["rock", "rock"], &["jazz", "unknown"]],
        );
        let (cleaned, report) = clean(input.clone());
        assert_eq!(cleaned, input);
        assert!(!report.dropped_all_artists);
        assert_eq!(report.null_genres_before, 0);
    }

    #[test]
    fn test_clean_without_primary_genre_column() {
        let input = table(&["genres"], &[&[""], &["rock"]]);
        let (cleaned, _) = clean(input);
        assert_eq!(cleaned.get(0, "genres"), Some("unknown"));
        assert_eq!(cleaned.get(1, "genres"), Some("rock"));
    }

    #[test]
    fn test_clean_without_genres_column_appends_it() {
        let input = table(&["primary_genre", "all_artists"], &[&["salsa", "A"], &["", "B"]]);
        let (cleaned, report) = clean(input);
        assert_eq!(cleaned.columns, vec!["primary_genre", "genres"]);
        assert_eq!(cleaned.rows[0], vec!["salsa", "salsa"]);
        assert_eq!(cleaned.rows[1], vec!["", "unknown"]);
        assert_eq!(report.null_genres_before, 2);
        assert_eq!(report.null_genres_after, 0);
    }

    #[test]
    fn test_clean_keeps_whitespace_genres() {
        let input = table(&["genres", "primary_genre"], &[&[" ", "rock"], &["", "rock"]]);
        let (cleaned, report) = clean(input);
        assert_eq!(cleaned.get(0, "genres"), Some(" "));
        assert_eq!(cleaned.get(1, "genres"), Some("rock"));
        assert_eq!(report.null_genres_before, 1);
    }

    #[test]
    fn test_clean_empty_table() {
        let input = table(&["genres", "primary_genre", "all_artists"], &[]);
        let (cleaned, report) = clean(input);
        assert!(cleaned.is_empty());
        assert_eq!(cleaned.columns, vec!["genres", "primary_genre"]);
        assert_eq!(report.null_genres_after, 0);
    }
}
