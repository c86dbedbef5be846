//! Subcommand implementations.

use std::path::{Path, PathBuf};

use anyhow::Result;

use examlens_core::config::ExamlensConfig;
use examlens_core::error::MetricsError;
use examlens_core::fixtures::builtin_dataset;
use examlens_core::model::Dataset;
use examlens_core::parser::load_dataset;

pub mod compare;
pub mod init;
pub mod predict;
pub mod summary;
pub mod validate;

/// Load the dataset named on the command line, else the configured default,
/// else the built-in one.
pub fn resolve_dataset(explicit: Option<&Path>, config: &ExamlensConfig) -> Result<Dataset> {
    let path: Option<PathBuf> = explicit
        .map(Path::to_path_buf)
        .or_else(|| config.default_dataset.clone());

    match path {
        Some(path) => load_dataset(&path),
        None => {
            tracing::debug!("no dataset given, using built-in dataset");
            builtin_dataset()
        }
    }
}

/// Turn a metrics failure into a CLI error, with a hint when more history
/// would fix it.
pub fn metrics_failure(err: MetricsError) -> anyhow::Error {
    if err.is_missing_data() {
        anyhow::Error::new(err)
            .context("not enough test history for a prediction; add at least two progress entries")
    } else {
        err.into()
    }
}
