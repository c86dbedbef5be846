//! Dashboard report snapshots with JSON persistence and baseline comparison.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::MetricsError;
use crate::metrics::{self, MetricsConfig, ScorePrediction};
use crate::model::{Dataset, FocusArea, Mastery, MistakePattern, TestRecord};
use crate::statistics::{
    self, AttemptBreakdown, SubjectAccuracy, SubjectScoreRow, TopicAccuracy,
};

/// Every derived dashboard number for one dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Name of the dataset the report was computed from.
    pub dataset: String,
    /// The test the point-in-time metrics describe.
    pub latest_test: TestSummary,
    /// Percent of attempted questions answered correctly.
    pub overall_accuracy: u32,
    pub prediction: ScorePrediction,
    /// Accuracy shown next to the predicted score.
    pub predicted_accuracy: u32,
    pub study_efficiency: u32,
    /// Score gained across the whole timeline.
    pub score_improvement: i32,
    /// Accuracy gained across the whole timeline, in points.
    pub accuracy_improvement: f64,
    pub subjects: Vec<SubjectAccuracy>,
    /// Focus areas still classified as weak.
    pub weak_areas: Vec<FocusArea>,
    /// How the latest test's questions were answered.
    #[serde(default)]
    pub attempts: AttemptBreakdown,
    /// Every topic of the latest test, subject by subject.
    #[serde(default)]
    pub topics: Vec<TopicAccuracy>,
    /// Subject scores for every test, oldest first.
    #[serde(default)]
    pub subject_history: Vec<SubjectScoreRow>,
    #[serde(default)]
    pub strong_areas: Vec<FocusArea>,
    #[serde(default)]
    pub mistake_patterns: Vec<MistakePattern>,
}

/// The identifying fields of a test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSummary {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    pub score: i32,
    pub max_score: u32,
}

impl From<&TestRecord> for TestSummary {
    fn from(test: &TestRecord) -> Self {
        Self {
            id: test.id.clone(),
            name: test.name.clone(),
            date: test.date,
            score: test.score,
            max_score: test.max_score,
        }
    }
}

impl DashboardReport {
    /// Derive all dashboard metrics from `dataset`.
    pub fn compute(dataset: &Dataset, config: &MetricsConfig) -> Result<Self, MetricsError> {
        config.validate()?;

        let latest = metrics::latest_test(&dataset.tests)?;
        let overall_accuracy = metrics::overall_accuracy(&dataset.tests)?;
        let prediction = metrics::score_prediction(&dataset.progress, config)?;
        let study_efficiency = metrics::study_efficiency(&dataset.tests, config)?;

        let score_improvement =
            statistics::score_improvement(&dataset.progress).ok_or(MetricsError::NoDataAvailable)?;
        let accuracy_improvement = statistics::accuracy_improvement(&dataset.progress)
            .ok_or(MetricsError::NoDataAvailable)?;

        let weak_areas = statistics::areas_with_mastery(&dataset.weak_areas, Mastery::Weak)
            .into_iter()
            .cloned()
            .collect();

        tracing::info!(
            dataset = %dataset.name,
            overall_accuracy,
            predicted = prediction.predicted,
            study_efficiency,
            "computed dashboard report"
        );

        Ok(Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            dataset: dataset.name.clone(),
            latest_test: TestSummary::from(latest),
            overall_accuracy,
            prediction,
            predicted_accuracy: statistics::predicted_accuracy(prediction.predicted),
            study_efficiency,
            score_improvement,
            accuracy_improvement,
            subjects: statistics::subject_accuracy(latest),
            weak_areas,
            attempts: statistics::attempt_breakdown(latest),
            topics: statistics::topic_breakdown(latest),
            subject_history: statistics::subject_score_history(&dataset.tests),
            strong_areas: dataset.strong_areas.clone(),
            mistake_patterns: dataset.mistake_patterns.clone(),
        })
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: DashboardReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Headline metrics by name, in display order.
    pub fn headline_metrics(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("overall_accuracy", self.overall_accuracy as f64),
            ("predicted_score", self.prediction.predicted as f64),
            ("clearing_chance", self.prediction.clearing_chance as f64),
            ("study_efficiency", self.study_efficiency as f64),
            ("latest_score", self.latest_test.score as f64),
        ]
    }

    /// Compare this report against a baseline.
    ///
    /// A metric whose value moved by more than `threshold` points is a
    /// regression (down) or improvement (up); anything else is unchanged.
    /// Subjects are matched by name.
    pub fn compare(&self, baseline: &DashboardReport, threshold: f64) -> ReportComparison {
        let mut comparison = ReportComparison::default();

        let baseline_metrics = baseline.headline_metrics();
        for ((name, current), (_, previous)) in
            self.headline_metrics().into_iter().zip(baseline_metrics)
        {
            comparison.classify(name.to_string(), previous, current, threshold);
        }

        for subject in &self.subjects {
            match baseline.subjects.iter().find(|s| s.name == subject.name) {
                Some(previous) => comparison.classify(
                    format!("{} accuracy", subject.name),
                    previous.accuracy as f64,
                    subject.accuracy as f64,
                    threshold,
                ),
                None => comparison.new_subjects += 1,
            }
        }

        comparison.removed_subjects = baseline
            .subjects
            .iter()
            .filter(|s| !self.subjects.iter().any(|c| c.name == s.name))
            .count();

        comparison
    }
}

/// Result of comparing two reports.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportComparison {
    /// Metrics that went down.
    pub regressions: Vec<MetricDelta>,
    /// Metrics that went up.
    pub improvements: Vec<MetricDelta>,
    /// Metrics with no significant change.
    pub unchanged: usize,
    /// Subjects in current but not baseline.
    pub new_subjects: usize,
    /// Subjects in baseline but not current.
    pub removed_subjects: usize,
}

/// How one metric moved between two reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricDelta {
    pub metric: String,
    pub baseline: f64,
    pub current: f64,
    pub delta: f64,
}

impl ReportComparison {
    fn classify(&mut self, metric: String, baseline: f64, current: f64, threshold: f64) {
        let delta = current - baseline;
        let entry = MetricDelta {
            metric,
            baseline,
            current,
            delta,
        };
        if delta < -threshold {
            self.regressions.push(entry);
        } else if delta > threshold {
            self.improvements.push(entry);
        } else {
            self.unchanged += 1;
        }
    }

    /// Format the comparison as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Summary:** {} regressions, {} improvements, {} unchanged\n\n",
            self.regressions.len(),
            self.improvements.len(),
            self.unchanged
        ));

        for (title, rows) in [
            ("Regressions", &self.regressions),
            ("Improvements", &self.improvements),
        ] {
            if rows.is_empty() {
                continue;
            }
            md.push_str(&format!("### {title}\n\n"));
            md.push_str("| Metric | Baseline | Current | Delta |\n");
            md.push_str("|--------|----------|---------|-------|\n");
            for r in rows {
                md.push_str(&format!(
                    "| {} | {:.0} | {:.0} | {:+.0} |\n",
                    r.metric, r.baseline, r.current, r.delta
                ));
            }
            md.push('\n');
        }

        md
    }

    /// Returns true if there are any regressions.
    pub fn has_regressions(&self) -> bool {
        !self.regressions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::builtin_dataset;

    fn fixture_report() -> DashboardReport {
        DashboardReport::compute(&builtin_dataset().unwrap(), &MetricsConfig::default()).unwrap()
    }

    #[test]
    fn compute_fixture_report() {
        let report = fixture_report();
        assert_eq!(report.dataset, "JEE Main Mock Series");
        assert_eq!(report.latest_test.id, "test-3");
        assert_eq!(report.overall_accuracy, 75);
        assert_eq!(report.prediction.predicted, 245);
        assert_eq!(report.prediction.clearing_chance, 98);
        assert_eq!(report.predicted_accuracy, 82);
        assert_eq!(report.study_efficiency, 84);
        assert_eq!(report.score_improvement, 115);
        assert_eq!(report.accuracy_improvement, 27.0);
        assert_eq!(report.subjects.len(), 3);
        assert_eq!(report.weak_areas.len(), 4);
    }

    #[test]
    fn compute_includes_breakdowns() {
        let report = fixture_report();
        assert_eq!(
            report.attempts,
            AttemptBreakdown {
                correct: 64,
                incorrect: 21,
                skipped: 5
            }
        );
        assert_eq!(report.topics.len(), 14);
        assert_eq!(report.topics[0].topic, "Mechanics");
        assert_eq!(report.subject_history.len(), 3);
        assert_eq!(report.subject_history[2].score_for("Physics"), 81);
        assert_eq!(report.strong_areas.len(), 6);
        assert_eq!(report.mistake_patterns.len(), 4);
    }

    #[test]
    fn older_report_json_still_loads() {
        let mut json = serde_json::to_value(fixture_report()).unwrap();
        let fields = json.as_object_mut().unwrap();
        for key in [
            "attempts",
            "topics",
            "subject_history",
            "strong_areas",
            "mistake_patterns",
        ] {
            fields.remove(key);
        }

        let report: DashboardReport = serde_json::from_value(json).unwrap();
        assert_eq!(report.attempts, AttemptBreakdown::default());
        assert!(report.topics.is_empty());
        assert_eq!(report.overall_accuracy, 75);
    }

    #[test]
    fn compute_empty_dataset() {
        let err = DashboardReport::compute(&Dataset::default(), &MetricsConfig::default())
            .unwrap_err();
        assert_eq!(err, MetricsError::NoDataAvailable);
    }

    #[test]
    fn compute_rejects_bad_config() {
        let config = MetricsConfig {
            max_score: 0,
            ..MetricsConfig::default()
        };
        let err = DashboardReport::compute(&builtin_dataset().unwrap(), &config).unwrap_err();
        assert!(matches!(err, MetricsError::InvalidConfig(_)));
    }

    #[test]
    fn compare_identical_reports() {
        let report = fixture_report();
        let comparison = report.compare(&report.clone(), 0.5);
        assert!(comparison.regressions.is_empty());
        assert!(comparison.improvements.is_empty());
        // five headline metrics plus three subjects
        assert_eq!(comparison.unchanged, 8);
    }

    #[test]
    fn compare_detects_regression() {
        let baseline = fixture_report();
        let mut current = baseline.clone();
        current.overall_accuracy = 70;
        current.subjects[0].accuracy += 10;

        let comparison = current.compare(&baseline, 1.0);
        assert_eq!(comparison.regressions.len(), 1);
        assert_eq!(comparison.regressions[0].metric, "overall_accuracy");
        assert_eq!(comparison.regressions[0].delta, -5.0);
        assert_eq!(comparison.improvements.len(), 1);
        assert_eq!(comparison.improvements[0].metric, "Physics accuracy");
        assert!(comparison.has_regressions());
    }

    #[test]
    fn compare_within_threshold_is_unchanged() {
        let baseline = fixture_report();
        let mut current = baseline.clone();
        current.study_efficiency += 2;
        let comparison = current.compare(&baseline, 3.0);
        assert!(!comparison.has_regressions());
        assert!(comparison.improvements.is_empty());
    }

    #[test]
    fn compare_with_new_and_removed_subjects() {
        let baseline = fixture_report();
        let mut current = baseline.clone();
        current.subjects[2].name = "Biology".into();

        let comparison = current.compare(&baseline, 0.5);
        assert_eq!(comparison.new_subjects, 1);
        assert_eq!(comparison.removed_subjects, 1);
    }

    #[test]
    fn json_roundtrip() {
        let report = fixture_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("report.json");

        report.save_json(&path).unwrap();
        let loaded = DashboardReport::load_json(&path).unwrap();

        assert_eq!(loaded.id, report.id);
        assert_eq!(loaded.prediction, report.prediction);
        assert_eq!(loaded.weak_areas, report.weak_areas);
    }

    #[test]
    fn markdown_output() {
        let baseline = fixture_report();
        let mut current = baseline.clone();
        current.prediction.predicted = 230;

        let md = current.compare(&baseline, 1.0).to_markdown();
        assert!(md.contains("1 regressions"));
        assert!(md.contains("### Regressions"));
        assert!(md.contains("| predicted_score | 245 | 230 | -15 |"));
        assert!(!md.contains("### Improvements"));
    }
}
