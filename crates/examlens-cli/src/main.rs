//! examlens CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "examlens", version, about = "Exam performance metrics")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute dashboard metrics for a dataset
    Summary {
        /// Dataset file (.toml or .json); defaults to the configured or built-in dataset
        #[arg(long)]
        dataset: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Save the report as JSON into the configured output directory
        #[arg(long)]
        save: bool,

        /// Save the report as JSON into this directory
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show the score trend line and next-test prediction
    Predict {
        /// Dataset file (.toml or .json); defaults to the configured or built-in dataset
        #[arg(long)]
        dataset: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate dataset files
    Validate {
        /// Path to dataset file or directory
        #[arg(long)]
        dataset: PathBuf,
    },

    /// Compare two saved dashboard reports
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Change in points below which a metric counts as unchanged
        #[arg(long, default_value = "1.0")]
        threshold: f64,

        /// Exit code 1 if regressions found
        #[arg(long)]
        fail_on_regression: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Create starter config and sample dataset
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("examlens=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Summary {
            dataset,
            config,
            format,
            save,
            output,
        } => commands::summary::execute(dataset, config, format, save, output),
        Commands::Predict { dataset, config } => commands::predict::execute(dataset, config),
        Commands::Validate { dataset } => commands::validate::execute(dataset),
        Commands::Compare {
            baseline,
            current,
            threshold,
            fail_on_regression,
            format,
        } => commands::compare::execute(baseline, current, threshold, fail_on_regression, format),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
