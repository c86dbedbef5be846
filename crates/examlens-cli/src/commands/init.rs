//! The `examlens init` command.

use anyhow::Result;

use examlens_core::fixtures::BUILTIN_DATASET_TOML;

pub fn execute() -> Result<()> {
    // Create examlens.toml
    if std::path::Path::new("examlens.toml").exists() {
        println!("examlens.toml already exists, skipping.");
    } else {
        std::fs::write("examlens.toml", SAMPLE_CONFIG)?;
        println!("Created examlens.toml");
    }

    // Create sample dataset
    std::fs::create_dir_all("datasets")?;
    let sample_path = std::path::Path::new("datasets/sample.toml");
    if sample_path.exists() {
        println!("datasets/sample.toml already exists, skipping.");
    } else {
        std::fs::write(sample_path, BUILTIN_DATASET_TOML)?;
        println!("Created datasets/sample.toml");
    }

    println!("\nNext steps:");
    println!("  1. Replace datasets/sample.toml with your own test history");
    println!("  2. Run: examlens validate --dataset datasets/sample.toml");
    println!("  3. Run: examlens summary");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# examlens configuration

default_dataset = "datasets/sample.toml"
output_dir = "./examlens-reports"

[metrics]
accuracy_weight = 0.7
time_weight = 0.3
target_score = 200
max_score = 300
clearing_chance_cap = 98
clamp_efficiency = false
"#;
