//! The `examlens summary` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use examlens_core::config::load_config_from;
use examlens_core::model::FocusArea;
use examlens_core::report::DashboardReport;

use super::{metrics_failure, resolve_dataset};

pub fn execute(
    dataset_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    format: String,
    save: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let dataset = resolve_dataset(dataset_path.as_deref(), &config)?;

    let report = DashboardReport::compute(&dataset, &config.metrics).map_err(metrics_failure)?;

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        "markdown" | "md" => println!("{}", to_markdown(&report)),
        "text" => print_text(&report),
        other => anyhow::bail!("unknown format: {other} (expected text, json or markdown)"),
    }

    if save || output.is_some() {
        let dir = output.unwrap_or(config.output_dir);
        let timestamp = report.created_at.format("%Y-%m-%dT%H%M%S");
        let path = dir.join(format!("report-{timestamp}.json"));
        report.save_json(&path)?;
        eprintln!("Report saved to: {}", path.display());
    }

    Ok(())
}

fn print_text(report: &DashboardReport) {
    println!(
        "Dataset: {} (latest: {}, {})",
        report.dataset, report.latest_test.name, report.latest_test.date
    );

    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec![
        Cell::new("Latest score"),
        Cell::new(format!(
            "{}/{}",
            report.latest_test.score, report.latest_test.max_score
        )),
    ]);
    table.add_row(vec![
        Cell::new("Overall accuracy"),
        Cell::new(format!("{}%", report.overall_accuracy)),
    ]);
    table.add_row(vec![
        Cell::new("Predicted score"),
        Cell::new(report.prediction.predicted),
    ]);
    table.add_row(vec![
        Cell::new("Clearing chance"),
        Cell::new(format!(
            "{}% (target {})",
            report.prediction.clearing_chance, report.prediction.target_score
        )),
    ]);
    table.add_row(vec![
        Cell::new("Study efficiency"),
        Cell::new(format!("{}%", report.study_efficiency)),
    ]);
    table.add_row(vec![
        Cell::new("Score improvement"),
        Cell::new(format!("{:+}", report.score_improvement)),
    ]);
    table.add_row(vec![
        Cell::new("Accuracy improvement"),
        Cell::new(format!("{:+.0} pts", report.accuracy_improvement)),
    ]);
    println!("{table}");

    if !report.subjects.is_empty() {
        let mut subjects = Table::new();
        subjects.set_header(vec!["Subject", "Accuracy", "Score", "Time"]);
        for s in &report.subjects {
            subjects.add_row(vec![
                Cell::new(&s.name),
                Cell::new(format!("{}%", s.accuracy)),
                Cell::new(format!("{}/{}", s.score, s.max_score)),
                Cell::new(format!("{} min", s.time_taken)),
            ]);
        }
        println!("{subjects}");
    }

    println!(
        "Answers: {} correct, {} incorrect, {} skipped",
        report.attempts.correct, report.attempts.incorrect, report.attempts.skipped
    );

    if !report.topics.is_empty() {
        let mut topics = Table::new();
        topics.set_header(vec!["Topic", "Subject", "Accuracy", "Mastery"]);
        for t in &report.topics {
            topics.add_row(vec![
                Cell::new(&t.topic),
                Cell::new(&t.subject),
                Cell::new(format!("{:.0}%", t.accuracy)),
                Cell::new(t.mastery),
            ]);
        }
        println!("{topics}");
    }

    if let Some(table) = subject_history_table(report) {
        println!("{table}");
    }

    print_areas("Weak areas:", &report.weak_areas);
    print_areas("Strong areas:", &report.strong_areas);

    if !report.mistake_patterns.is_empty() {
        println!("Mistake patterns:");
        for m in &report.mistake_patterns {
            println!("  {} {}% ({} questions)", m.label, m.percentage, m.count);
        }
    }
}

fn print_areas(title: &str, areas: &[FocusArea]) {
    if areas.is_empty() {
        return;
    }
    println!("{title}");
    for area in areas {
        println!(
            "  {} ({}) {}% trend {} {:+}",
            area.topic, area.subject, area.accuracy, area.trend, area.trend_value
        );
    }
}

/// Subject names in first-seen order across the history.
fn history_subjects(report: &DashboardReport) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for row in &report.subject_history {
        for (name, _) in &row.scores {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
    }
    names
}

fn subject_history_table(report: &DashboardReport) -> Option<Table> {
    let subjects = history_subjects(report);
    if subjects.is_empty() {
        return None;
    }

    let mut table = Table::new();
    let mut header = vec!["Test"];
    header.extend(subjects.iter().copied());
    table.set_header(header);
    for row in &report.subject_history {
        let mut cells = vec![Cell::new(&row.test_name)];
        cells.extend(subjects.iter().map(|s| Cell::new(row.score_for(s))));
        table.add_row(cells);
    }
    Some(table)
}

fn to_markdown(report: &DashboardReport) -> String {
    let mut md = String::new();

    md.push_str(&format!("## {}\n\n", report.dataset));
    md.push_str(&format!(
        "Latest test: **{}** ({}), {}/{}\n\n",
        report.latest_test.name,
        report.latest_test.date,
        report.latest_test.score,
        report.latest_test.max_score
    ));
    md.push_str("| Metric | Value |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!(
        "| Overall accuracy | {}% |\n",
        report.overall_accuracy
    ));
    md.push_str(&format!(
        "| Predicted score | {} |\n",
        report.prediction.predicted
    ));
    md.push_str(&format!(
        "| Clearing chance | {}% |\n",
        report.prediction.clearing_chance
    ));
    md.push_str(&format!(
        "| Study efficiency | {}% |\n",
        report.study_efficiency
    ));
    md.push('\n');
    md.push_str(&format!(
        "Answers: {} correct, {} incorrect, {} skipped\n\n",
        report.attempts.correct, report.attempts.incorrect, report.attempts.skipped
    ));

    if !report.subjects.is_empty() {
        md.push_str("| Subject | Accuracy | Score |\n");
        md.push_str("|---------|----------|-------|\n");
        for s in &report.subjects {
            md.push_str(&format!(
                "| {} | {}% | {}/{} |\n",
                s.name, s.accuracy, s.score, s.max_score
            ));
        }
        md.push('\n');
    }

    if !report.topics.is_empty() {
        md.push_str("### Topics\n\n");
        md.push_str("| Topic | Subject | Accuracy | Mastery |\n");
        md.push_str("|-------|---------|----------|---------|\n");
        for t in &report.topics {
            md.push_str(&format!(
                "| {} | {} | {:.0}% | {} |\n",
                t.topic, t.subject, t.accuracy, t.mastery
            ));
        }
        md.push('\n');
    }

    let subjects = history_subjects(report);
    if !subjects.is_empty() {
        md.push_str("### Subject scores\n\n");
        md.push_str(&format!("| Test | {} |\n", subjects.join(" | ")));
        md.push_str(&format!("|------|{}\n", "------|".repeat(subjects.len())));
        for row in &report.subject_history {
            let scores: Vec<String> = subjects
                .iter()
                .map(|s| row.score_for(s).to_string())
                .collect();
            md.push_str(&format!("| {} | {} |\n", row.test_name, scores.join(" | ")));
        }
        md.push('\n');
    }

    for (title, areas) in [
        ("Weak areas", &report.weak_areas),
        ("Strong areas", &report.strong_areas),
    ] {
        if areas.is_empty() {
            continue;
        }
        md.push_str(&format!("### {title}\n\n"));
        for a in areas {
            md.push_str(&format!(
                "- {} ({}): {}%, {} {:+}\n",
                a.topic, a.subject, a.accuracy, a.trend, a.trend_value
            ));
        }
        md.push('\n');
    }

    if !report.mistake_patterns.is_empty() {
        md.push_str("### Mistake patterns\n\n");
        for m in &report.mistake_patterns {
            md.push_str(&format!("- {}: {}% ({} questions)\n", m.label, m.percentage, m.count));
        }
    }

    md
}
