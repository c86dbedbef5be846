//! The `examlens predict` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use examlens_core::config::load_config_from;
use examlens_core::metrics::score_prediction;
use examlens_core::statistics::{linear_fit, predicted_accuracy};

use super::{metrics_failure, resolve_dataset};

pub fn execute(dataset_path: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let dataset = resolve_dataset(dataset_path.as_deref(), &config)?;

    let prediction =
        score_prediction(&dataset.progress, &config.metrics).map_err(metrics_failure)?;
    // score_prediction succeeded, so there are at least two points
    let fit = linear_fit(&dataset.progress_scores());

    let mut table = Table::new();
    table.set_header(vec!["#", "Test", "Date", "Score", "Trend"]);
    for (i, entry) in dataset.progress.iter().enumerate() {
        let trend = fit
            .map(|f| format!("{:.1}", f.at(i as f64)))
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(i),
            Cell::new(&entry.name),
            Cell::new(entry.date),
            Cell::new(entry.score),
            Cell::new(trend),
        ]);
    }
    table.add_row(vec![
        Cell::new(dataset.progress.len()),
        Cell::new("Predicted"),
        Cell::new(""),
        Cell::new(prediction.predicted),
        Cell::new(""),
    ]);
    println!("{table}");

    if let Some(fit) = fit {
        println!(
            "Trend: {:+.2} points per test (intercept {:.2})",
            fit.slope, fit.intercept
        );
    }
    println!(
        "Predicted next score: {} (capped at {})",
        prediction.predicted, config.metrics.max_score
    );
    println!(
        "Predicted accuracy: {}%",
        predicted_accuracy(prediction.predicted)
    );
    println!(
        "Clearing chance: {}% against a cutoff of {}",
        prediction.clearing_chance, prediction.target_score
    );

    Ok(())
}
