//! Trend fitting and descriptive statistics over test history.
//!
//! Everything here is a pure function of the records passed in. The headline
//! dashboard numbers live in [`crate::metrics`]; this module holds the linear
//! fit they build on and the per-subject and per-topic breakdowns.

use serde::{Deserialize, Serialize};

use crate::model::{FocusArea, Mastery, ProgressEntry, TestRecord};

/// An ordinary least-squares line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    /// Evaluate the line at `x`.
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit `values[i]` against `i` using the closed-form sums.
///
/// Returns `None` for fewer than two points, where the index variance is
/// zero and the slope is undefined.
pub fn linear_fit(values: &[f64]) -> Option<LinearFit> {
    if values.len() < 2 {
        return None;
    }

    let n = values.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_x2) = (0.0f64, 0.0f64, 0.0f64, 0.0f64);
    for (i, &y) in values.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
    }

    let denominator = n * sum_x2 - sum_x * sum_x;
    if denominator == 0.0 {
        return None;
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;
    Some(LinearFit { slope, intercept })
}

/// Accuracy and score for one subject of a test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectAccuracy {
    pub name: String,
    /// Rounded percentage of attempted questions answered correctly.
    pub accuracy: u32,
    pub score: i32,
    pub max_score: u32,
    pub time_taken: u32,
}

/// Per-subject accuracy for a test. Subjects with nothing attempted report 0.
pub fn subject_accuracy(test: &TestRecord) -> Vec<SubjectAccuracy> {
    test.subjects
        .iter()
        .map(|s| SubjectAccuracy {
            name: s.name.clone(),
            accuracy: rounded_percent(s.correct, s.attempted),
            score: s.score,
            max_score: s.max_score,
            time_taken: s.time_taken,
        })
        .collect()
}

/// A topic flattened out of its subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicAccuracy {
    pub topic: String,
    pub subject: String,
    pub accuracy: f64,
    pub mastery: Mastery,
}

/// Every topic of a test, in subject then topic order.
pub fn topic_breakdown(test: &TestRecord) -> Vec<TopicAccuracy> {
    test.subjects
        .iter()
        .flat_map(|s| {
            s.topics.iter().map(move |t| TopicAccuracy {
                topic: t.name.clone(),
                subject: s.name.clone(),
                accuracy: t.accuracy,
                mastery: t.mastery,
            })
        })
        .collect()
}

/// How the questions of a test were answered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptBreakdown {
    pub correct: u32,
    pub incorrect: u32,
    pub skipped: u32,
}

pub fn attempt_breakdown(test: &TestRecord) -> AttemptBreakdown {
    AttemptBreakdown {
        correct: test.correct,
        incorrect: test.incorrect,
        skipped: test.skipped,
    }
}

/// Subject scores for one test, keyed by subject name in paper order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectScoreRow {
    pub test_name: String,
    pub scores: Vec<(String, i32)>,
}

impl SubjectScoreRow {
    /// Score for `subject`, or 0 if the test did not include it.
    pub fn score_for(&self, subject: &str) -> i32 {
        self.scores
            .iter()
            .find(|(name, _)| name == subject)
            .map(|(_, score)| *score)
            .unwrap_or(0)
    }
}

/// Per-test subject scores across the whole history.
pub fn subject_score_history(tests: &[TestRecord]) -> Vec<SubjectScoreRow> {
    tests
        .iter()
        .map(|t| SubjectScoreRow {
            test_name: t.name.clone(),
            scores: t.subjects.iter().map(|s| (s.name.clone(), s.score)).collect(),
        })
        .collect()
}

/// Score gained between the first and last timeline entries.
pub fn score_improvement(progress: &[ProgressEntry]) -> Option<i32> {
    let first = progress.first()?;
    let last = progress.last()?;
    Some(last.score - first.score)
}

/// Accuracy gained between the first and last timeline entries, in points.
pub fn accuracy_improvement(progress: &[ProgressEntry]) -> Option<f64> {
    let first = progress.first()?;
    let last = progress.last()?;
    Some(last.accuracy - first.accuracy)
}

/// Accuracy plotted alongside a predicted score: one point per three marks,
/// capped at 100.
pub fn predicted_accuracy(predicted_score: i32) -> u32 {
    (predicted_score.max(0) as f64 / 3.0).round().min(100.0) as u32
}

/// Focus areas at exactly `mastery`, in input order.
pub fn areas_with_mastery(areas: &[FocusArea], mastery: Mastery) -> Vec<&FocusArea> {
    areas.iter().filter(|a| a.mastery == mastery).collect()
}

fn rounded_percent(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    (part as f64 / whole as f64 * 100.0).round() as u32
}
