//! Dataset file parser.
//!
//! Loads datasets from TOML or JSON files and directories, and validates
//! them before any metric is computed.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::DatasetError;
use crate::model::{Dataset, FocusArea, MistakePattern, ProgressEntry, SubjectRecord, TestRecord};

/// On-disk file formats a dataset can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Toml,
    Json,
}

impl DatasetFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, DatasetError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Ok(DatasetFormat::Toml),
            Some("json") => Ok(DatasetFormat::Json),
            Some(other) => Err(DatasetError::UnsupportedFormat(format!(".{other}"))),
            None => Err(DatasetError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Intermediate structure for dataset files.
#[derive(Debug, Deserialize)]
struct DatasetFile {
    #[serde(default)]
    dataset: DatasetHeader,
    #[serde(default)]
    tests: Vec<TestRecord>,
    #[serde(default)]
    progress: Vec<ProgressEntry>,
    #[serde(default)]
    weak_areas: Vec<FocusArea>,
    #[serde(default)]
    strong_areas: Vec<FocusArea>,
    #[serde(default)]
    mistake_patterns: Vec<MistakePattern>,
}

#[derive(Debug, Default, Deserialize)]
struct DatasetHeader {
    #[serde(default)]
    name: String,
}

/// Parse a single dataset file. Does not validate.
pub fn parse_dataset(path: &Path) -> Result<Dataset> {
    let format = DatasetFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset file: {}", path.display()))?;

    parse_dataset_str(&content, format, path)
}

/// Parse a dataset from a string (useful for testing).
pub fn parse_dataset_str(content: &str, format: DatasetFormat, source_path: &Path) -> Result<Dataset> {
    let parsed: DatasetFile = match format {
        DatasetFormat::Toml => toml::from_str(content)
            .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?,
        DatasetFormat::Json => serde_json::from_str(content)
            .with_context(|| format!("failed to parse JSON: {}", source_path.display()))?,
    };

    let name = if parsed.dataset.name.is_empty() {
        source_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    } else {
        parsed.dataset.name
    };

    Ok(Dataset {
        name,
        tests: parsed.tests,
        progress: parsed.progress,
        weak_areas: parsed.weak_areas,
        strong_areas: parsed.strong_areas,
        mistake_patterns: parsed.mistake_patterns,
    })
}

/// Parse and validate a dataset, failing on any error-severity issue.
///
/// Warnings are logged and otherwise ignored.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let dataset = parse_dataset(path)?;
    check_dataset(dataset, &path.display().to_string())
}

/// Validate an already-parsed dataset, failing on any error-severity issue.
pub fn check_dataset(dataset: Dataset, source_name: &str) -> Result<Dataset> {
    let (errors, warnings): (Vec<_>, Vec<_>) = validate_dataset(&dataset)
        .into_iter()
        .partition(|i| i.severity == Severity::Error);

    for w in &warnings {
        tracing::warn!("{source_name}: {w}");
    }

    if !errors.is_empty() {
        return Err(DatasetError::Invalid {
            source_name: source_name.to_string(),
            issues: errors,
        }
        .into());
    }

    tracing::debug!(
        tests = dataset.tests.len(),
        progress = dataset.progress.len(),
        "loaded dataset {source_name}"
    );
    Ok(dataset)
}

/// Recursively collect every `.toml` and `.json` file under `dir`, sorted by
/// path.
pub fn find_dataset_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();

    let mut files = Vec::new();
    for path in entries {
        if path.is_dir() {
            files.extend(find_dataset_files(&path)?);
        } else if DatasetFormat::from_path(&path).is_ok() {
            files.push(path);
        }
    }

    Ok(files)
}

/// Recursively load every `.toml` and `.json` dataset in a directory.
///
/// Files that fail to parse or validate are skipped with a warning.
pub fn load_dataset_directory(dir: &Path) -> Result<Vec<Dataset>> {
    let mut sets = Vec::new();

    for path in find_dataset_files(dir)? {
        match load_dataset(&path) {
            Ok(set) => sets.push(set),
            Err(e) => {
                tracing::warn!("skipping {}: {:#}", path.display(), e);
            }
        }
    }

    Ok(sets)
}

/// How serious a validation finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Breaks an invariant the metrics rely on.
    Error,
    /// Suspicious but computable.
    Warning,
}

/// A single finding from dataset validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    /// Where the issue was found, e.g. `tests[2].subjects[0]`.
    pub location: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.location, self.message)
    }
}

#[derive(Default)]
struct Issues(Vec<ValidationIssue>);

impl Issues {
    fn error(&mut self, location: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Error, location, message);
    }

    fn warning(&mut self, location: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Warning, location, message);
    }

    fn push(&mut self, severity: Severity, location: impl Into<String>, message: impl Into<String>) {
        self.0.push(ValidationIssue {
            severity,
            location: location.into(),
            message: message.into(),
        });
    }

    fn percent(&mut self, location: &str, field: &str, value: f64) {
        if !value.is_finite() || !(0.0..=100.0).contains(&value) {
            self.error(location, format!("{field} {value} is outside 0..=100"));
        }
    }
}

/// Validate a dataset for broken invariants and suspicious data.
pub fn validate_dataset(set: &Dataset) -> Vec<ValidationIssue> {
    let mut issues = Issues::default();

    let mut seen_ids = HashSet::new();
    for (i, test) in set.tests.iter().enumerate() {
        let loc = format!("tests[{i}]");
        if !seen_ids.insert(&test.id) {
            issues.error(&loc, format!("duplicate test ID: {}", test.id));
        }
        validate_test(test, &loc, &mut issues);
    }

    for pair in set.tests.windows(2) {
        if pair[1].date < pair[0].date {
            issues.warning(
                "tests",
                format!(
                    "'{}' ({}) is dated before '{}' ({})",
                    pair[1].id, pair[1].date, pair[0].id, pair[0].date
                ),
            );
        }
    }

    for (i, entry) in set.progress.iter().enumerate() {
        let loc = format!("progress[{i}]");
        issues.percent(&loc, "accuracy", entry.accuracy);
    }
    for (i, pair) in set.progress.windows(2).enumerate() {
        if pair[1].date < pair[0].date {
            issues.warning(
                format!("progress[{}]", i + 1),
                format!(
                    "entry dated {} comes after one dated {}; history is read in file order",
                    pair[1].date, pair[0].date
                ),
            );
        }
    }

    for (i, area) in set.weak_areas.iter().enumerate() {
        issues.percent(&format!("weak_areas[{i}]"), "accuracy", area.accuracy);
    }
    for (i, area) in set.strong_areas.iter().enumerate() {
        issues.percent(&format!("strong_areas[{i}]"), "accuracy", area.accuracy);
    }

    for (i, pattern) in set.mistake_patterns.iter().enumerate() {
        issues.percent(&format!("mistake_patterns[{i}]"), "percentage", pattern.percentage);
    }
    if !set.mistake_patterns.is_empty() {
        let total: f64 = set.mistake_patterns.iter().map(|p| p.percentage).sum();
        if (total - 100.0).abs() > 1.0 {
            issues.warning(
                "mistake_patterns",
                format!("percentages sum to {total}, expected 100"),
            );
        }
    }

    issues.0
}

fn validate_test(test: &TestRecord, loc: &str, issues: &mut Issues) {
    let answered = widen_sum(test.correct, test.incorrect);
    if answered != u64::from(test.attempted) {
        issues.error(
            loc,
            format!(
                "correct + incorrect ({answered}) != attempted ({})",
                test.attempted
            ),
        );
    }
    let covered = widen_sum(test.attempted, test.skipped);
    if covered != u64::from(test.total_questions) {
        issues.error(
            loc,
            format!(
                "attempted + skipped ({covered}) != total_questions ({})",
                test.total_questions
            ),
        );
    }
    if test.max_score == 0 {
        issues.error(loc, "max_score must be greater than zero");
    } else if i64::from(test.score) > i64::from(test.max_score) {
        issues.error(
            loc,
            format!("score {} exceeds max_score {}", test.score, test.max_score),
        );
    }
    if test.total_time == 0 {
        issues.error(loc, "total_time must be greater than zero");
    }

    if test.subjects.is_empty() {
        return;
    }

    for (j, subject) in test.subjects.iter().enumerate() {
        let sloc = format!("{loc}.subjects[{j}]");
        let answered = widen_sum(subject.correct, subject.incorrect);
        if answered != u64::from(subject.attempted) {
            issues.error(
                &sloc,
                format!(
                    "correct + incorrect ({answered}) != attempted ({})",
                    subject.attempted
                ),
            );
        }
        if subject.attempted > subject.total_questions {
            issues.error(
                &sloc,
                format!(
                    "attempted ({}) exceeds total_questions ({})",
                    subject.attempted, subject.total_questions
                ),
            );
        }
        if i64::from(subject.score) > i64::from(subject.max_score) {
            issues.error(
                &sloc,
                format!("score {} exceeds max_score {}", subject.score, subject.max_score),
            );
        }

        for (k, topic) in subject.topics.iter().enumerate() {
            let tloc = format!("{sloc}.topics[{k}]");
            let answered = widen_sum(topic.correct, topic.incorrect);
            if answered > u64::from(topic.total_questions) {
                issues.error(
                    &tloc,
                    format!(
                        "correct + incorrect ({answered}) exceeds total_questions ({})",
                        topic.total_questions
                    ),
                );
            }
            issues.percent(&tloc, "accuracy", topic.accuracy);
            if topic.total_questions > 0 && topic.accuracy.is_finite() {
                let expected =
                    (topic.correct as f64 / topic.total_questions as f64 * 100.0).round();
                if (topic.accuracy - expected).abs() > 1.0 {
                    issues.warning(
                        &tloc,
                        format!(
                            "accuracy {} does not match {}/{} (expected {expected})",
                            topic.accuracy, topic.correct, topic.total_questions
                        ),
                    );
                }
            }
        }
    }

    let total = |pick: fn(&SubjectRecord) -> i64| -> i64 { test.subjects.iter().map(pick).sum() };
    let checks = [
        ("attempted", total(|s| s.attempted as i64), test.attempted as i64),
        ("correct", total(|s| s.correct as i64), test.correct as i64),
        ("score", total(|s| s.score as i64), test.score as i64),
        ("time_taken", total(|s| s.time_taken as i64), test.time_taken as i64),
    ];
    for (field, subject_total, test_total) in checks {
        if subject_total != test_total {
            issues.warning(
                loc,
                format!("subject {field} sums to {subject_total}, test reports {test_total}"),
            );
        }
    }
}

/// Counts are `u32` on disk; add them without wrapping.
fn widen_sum(a: u32, b: u32) -> u64 {
    u64::from(a) + u64::from(b)
}
