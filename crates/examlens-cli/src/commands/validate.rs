//! The `examlens validate` command.

use std::path::PathBuf;

use anyhow::Result;

use examlens_core::parser::{find_dataset_files, parse_dataset, validate_dataset, Severity};

pub fn execute(dataset_path: PathBuf) -> Result<()> {
    let files = if dataset_path.is_dir() {
        find_dataset_files(&dataset_path)?
    } else {
        vec![dataset_path]
    };

    let mut total_errors = 0;
    let mut total_warnings = 0;

    for file in &files {
        let set = parse_dataset(file)?;
        println!(
            "Dataset: {} ({} tests, {} progress entries)",
            set.name,
            set.tests.len(),
            set.progress.len()
        );

        for issue in validate_dataset(&set) {
            match issue.severity {
                Severity::Error => {
                    total_errors += 1;
                    println!("  [{}] ERROR: {}", issue.location, issue.message);
                }
                Severity::Warning => {
                    total_warnings += 1;
                    println!("  [{}] WARNING: {}", issue.location, issue.message);
                }
            }
        }
    }

    if total_errors == 0 && total_warnings == 0 {
        println!("All datasets valid.");
    } else if total_errors == 0 {
        println!("\n{total_warnings} warning(s) found.");
    } else {
        println!("\n{total_errors} error(s), {total_warnings} warning(s) found.");
        anyhow::bail!("{total_errors} validation error(s)");
    }

    Ok(())
}
