//! Guards against overwriting a source table with generated output.

use anyhow::{bail, Result};
use std::path::Path;

/// Validates that an output path is safe to overwrite.
///
/// Checks:
/// - Output filename must contain the required marker (e.g., "enriched", "clean")
/// - Output cannot be the same file as any of the provided source paths
///
/// The default source tables (`dataset.csv`, `dataset_completo.csv`) carry
/// neither marker, so the first check already rejects them as outputs.
pub fn validate_output_path(output: &Path, required_marker: &str, source_paths: &[&Path]) -> Result<()> {
    let output_name = output.file_name().and_then(|n| n.to_str()).unwrap_or("");

    if !output_name.contains(required_marker) {
        bail!(
            "Safety check failed: output file '{}' must contain '{}' in the name",
            output.display(),
            required_marker
        );
    }

    for source in source_paths {
        if output == *source || same_file(output, source) {
            bail!(
                "Safety check failed: output '{}' cannot be the same as source '{}'",
                output.display(),
                source.display()
            );
        }
    }

    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_valid_output_enriched() {
        let output = PathBuf::from("/tmp/enriched_spotify_dataset.csv");
        let source = PathBuf::from("/data/dataset.csv");
        assert!(validate_output_path(&output, "enriched", &[&source]).is_ok());
    }

    #[test]
    fn test_valid_output_clean() {
        let output = PathBuf::from("/tmp/dataset_completo_clean.csv");
        let source = PathBuf::from("/data/dataset_completo.csv");
        assert!(validate_output_path(&output, "clean", &[&source]).is_ok());
    }

    #[test]
    fn test_missing_marker() {
        let output = PathBuf::from("/tmp/output.csv");
        let source = PathBuf::from("/data/dataset.csv");
        let result = validate_output_path(&output, "enriched", &[&source]);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("must contain 'enriched'"));
    }

    #[test]
    fn test_default_source_names_rejected() {
        let unrelated = PathBuf::from("/data/other.csv");
        for (name, marker) in [("dataset.csv", "enriched"), ("dataset_completo.csv", "clean")] {
            let output = PathBuf::from("/tmp").join(name);
            let err = validate_output_path(&output, marker, &[&unrelated]).unwrap_err();
            assert!(err.to_string().contains("must contain"));
        }
    }

    #[test]
    fn test_output_equals_source() {
        let path = PathBuf::from("/data/enriched.csv");
        let result = validate_output_path(&path, "enriched", &[&path]);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("cannot be the same as source"));
    }

    #[test]
    fn test_same_file_through_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("clean_input.csv");
        std::fs::write(&source, "genres\n").unwrap();
        let alias = dir.path().join(".").join("clean_input.csv");
        assert!(validate_output_path(&alias, "clean", &[&source]).is_err());
    }
}
