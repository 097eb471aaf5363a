//! Summary statistics printed after an enrichment run.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::fmt::Write;

use crate::models::FeatureRow;

const TOP_GENRES: usize = 10;

/// Describe-style statistics for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1); NaN for a single value
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

/// Linear-interpolated quantile of an already sorted slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

pub fn describe(values: &[f64]) -> Option<NumericSummary> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let std = if n > 1 {
        let var = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        var.sqrt()
    } else {
        f64::NAN
    };

    Some(NumericSummary {
        count: n,
        mean,
        std,
        min: sorted[0],
        p25: quantile(&sorted, 0.25),
        p50: quantile(&sorted, 0.5),
        p75: quantile(&sorted, 0.75),
        max: sorted[n - 1],
    })
}

/// Occurrences per distinct value, most frequent first (ties by value).
pub fn value_counts<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
    for v in values {
        *counts.entry(v).or_default() += 1;
    }
    let mut result: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(k, n)| (k.to_string(), n))
        .collect();
    result.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    result
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub total_rows: usize,
    pub numeric: Vec<(&'static str, Option<NumericSummary>)>,
    pub popularity_categories: Vec<(String, usize)>,
    pub album_types: Vec<(String, usize)>,
    pub top_primary_genres: Vec<(String, usize)>,
}

impl DatasetSummary {
    pub fn from_rows(rows: &[FeatureRow]) -> Self {
        let column = |f: fn(&FeatureRow) -> f64| rows.iter().map(f).collect::<Vec<f64>>();

        let numeric = vec![
            ("popularity", describe(&column(|r| r.popularity as f64))),
            ("duration_minutes", describe(&column(|r| r.duration_minutes))),
            ("artist_popularity", describe(&column(|r| r.artist_popularity as f64))),
            ("artist_followers", describe(&column(|r| r.artist_followers as f64))),
        ];

        let mut top_primary_genres = value_counts(rows.iter().map(|r| r.primary_genre.as_str()));
        top_primary_genres.truncate(TOP_GENRES);

        Self {
            total_rows: rows.len(),
            numeric,
            popularity_categories: value_counts(
                rows.iter().map(|r| r.popularity_category.as_str()),
            ),
            album_types: value_counts(rows.iter().map(|r| r.album_type.as_str())),
            top_primary_genres,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Total songs processed: {}", self.total_rows);
        let _ = writeln!(out, "Available columns: {}", FeatureRow::COLUMNS.join(", "));

        let _ = writeln!(out, "\nBasic statistics for key features:");
        let _ = writeln!(
            out,
            "{:<18} {:>6} {:>14} {:>14} {:>12} {:>12} {:>12} {:>12} {:>14}",
            "", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
        );
        for (name, summary) in &self.numeric {
            match summary {
                Some(s) => {
                    let _ = writeln!(
                        out,
                        "{:<18} {:>6} {:>14.2} {:>14.2} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>14.2}",
                        name, s.count, s.mean, s.std, s.min, s.p25, s.p50, s.p75, s.max
                    );
                }
                None => {
                    let _ = writeln!(out, "{:<18} {:>6}", name, 0);
                }
            }
        }

        render_counts(&mut out, "Distribution of popularity categories", &self.popularity_categories);
        render_counts(&mut out, "Distribution of album types", &self.album_types);
        render_counts(&mut out, "Top 10 primary genres", &self.top_primary_genres);
        out
    }
}

fn render_counts(out: &mut String, title: &str, counts: &[(String, usize)]) {
    let _ = writeln!(out, "\n{}:", title);
    for (value, n) in counts {
        let _ = writeln!(out, "  {:<30} {:>6}", value, n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::build_row;
    use crate::features::tests::{sample_artist, sample_track};
    use crate::models::InputRecord;

    #[test]
    fn test_describe() {
        let s = describe(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(s.count, 4);
        assert_eq!(s.mean, 2.5);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 4.0);
        assert_eq!(s.p25, 1.75);
        assert_eq!(s.p50, 2.5);
        assert_eq!(s.p75, 3.25);
        assert!((s.std - 1.2909944).abs() < 1e-6);
    }

    #[test]
    fn test_describe_edge_cases() {
        assert!(describe(&[]).is_none());
        let single = describe(&[7.0]).unwrap();
        assert_eq!(single.p50, 7.0);
        assert!(single.std.is_nan());
    }

    #[test]
    fn test_value_counts_order() {
        let counts = value_counts(["rock", "pop", "rock", "jazz", "pop", "rock"]);
        assert_eq!(
            counts,
            vec![
                ("rock".to_string(), 3),
                ("pop".to_string(), 2),
                ("jazz".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_summary_from_rows() {
        let row = build_row(
            &InputRecord::new("Foo Fighters", "Everlong"),
            &sample_track(&["ff"]),
            Ok(crate::features::ReleaseDate { year: 1997, month: 5 }),
            Ok(sample_artist()),
            2025,
        )
        .row;
        let summary = DatasetSummary::from_rows(&[row.clone(), row]);

        assert_eq!(summary.total_rows, 2);
        assert_eq!(summary.popularity_categories, vec![("high".to_string(), 2)]);
        assert_eq!(summary.album_types, vec![("album".to_string(), 2)]);
        assert_eq!(
            summary.top_primary_genres,
            vec![("alternative rock".to_string(), 2)]
        );
        let rendered = summary.render();
        assert!(rendered.contains("Total songs processed: 2"));
        assert!(rendered.contains("Top 10 primary genres"));
    }
}
