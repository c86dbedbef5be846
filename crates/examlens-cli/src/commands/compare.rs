//! The `examlens compare` command.

use std::path::PathBuf;

use anyhow::Result;

use examlens_core::report::DashboardReport;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    threshold: f64,
    fail_on_regression: bool,
    format: String,
) -> Result<()> {
    anyhow::ensure!(
        threshold.is_finite() && threshold >= 0.0,
        "threshold must be a non-negative number"
    );

    let baseline = DashboardReport::load_json(&baseline_path)?;
    let current = DashboardReport::load_json(&current_path)?;

    let report = current.compare(&baseline, threshold);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        "text" => {
            println!(
                "Comparison: {} regressions, {} improvements, {} unchanged",
                report.regressions.len(),
                report.improvements.len(),
                report.unchanged
            );

            if !report.regressions.is_empty() {
                println!("\nRegressions:");
                for r in &report.regressions {
                    println!(
                        "  {} {:.0} -> {:.0} ({:+.0})",
                        r.metric, r.baseline, r.current, r.delta
                    );
                }
            }

            if !report.improvements.is_empty() {
                println!("\nImprovements:");
                for i in &report.improvements {
                    println!(
                        "  {} {:.0} -> {:.0} ({:+.0})",
                        i.metric, i.baseline, i.current, i.delta
                    );
                }
            }

            if report.new_subjects > 0 {
                println!("\n{} new subject(s)", report.new_subjects);
            }
            if report.removed_subjects > 0 {
                println!("{} removed subject(s)", report.removed_subjects);
            }
        }
        other => anyhow::bail!("unknown format: {other} (expected text, json or markdown)"),
    }

    if fail_on_regression && report.has_regressions() {
        std::process::exit(1);
    }

    Ok(())
}
