//! The built-in JEE Main mock-test dataset.

use std::path::Path;

use anyhow::Result;

use crate::model::Dataset;
use crate::parser::{check_dataset, parse_dataset_str, DatasetFormat};

/// Raw TOML of the built-in dataset, also written out by `examlens init`.
pub const BUILTIN_DATASET_TOML: &str = include_str!("../fixtures/jee-main.toml");

/// Parse and validate the built-in dataset.
pub fn builtin_dataset() -> Result<Dataset> {
    let source = Path::new("builtin:jee-main.toml");
    let dataset = parse_dataset_str(BUILTIN_DATASET_TOML, DatasetFormat::Toml, source)?;
    check_dataset(dataset, "builtin:jee-main.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::validate_dataset;

    #[test]
    fn builtin_dataset_shape() {
        let dataset = builtin_dataset().unwrap();
        assert_eq!(dataset.name, "JEE Main Mock Series");
        assert_eq!(dataset.tests.len(), 3);
        assert_eq!(dataset.progress.len(), 7);
        assert_eq!(dataset.weak_areas.len(), 6);
        assert_eq!(dataset.strong_areas.len(), 6);
        assert_eq!(dataset.mistake_patterns.len(), 4);
    }

    #[test]
    fn builtin_dataset_is_clean() {
        let dataset = builtin_dataset().unwrap();
        assert!(validate_dataset(&dataset).is_empty());
    }

    #[test]
    fn builtin_progress_scores() {
        let dataset = builtin_dataset().unwrap();
        assert_eq!(
            dataset.progress_scores(),
            vec![120.0, 138.0, 155.0, 168.0, 182.0, 208.0, 235.0]
        );
    }

    #[test]
    fn builtin_latest_test_counts() {
        let dataset = builtin_dataset().unwrap();
        let latest = dataset.tests.last().unwrap();
        assert_eq!(latest.correct, 64);
        assert_eq!(latest.attempted, 85);
        assert_eq!(latest.time_taken, 172);
        assert_eq!(latest.total_time, 180);
    }
}
