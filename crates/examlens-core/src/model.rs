//! Core data model types for examlens.
//!
//! These are the records the metrics are derived from: completed tests with
//! their subject and topic breakdowns, the score timeline, focus areas and
//! mistake patterns. All of them are read-only once a dataset is loaded.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Four-level ordinal summary of how well a topic is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mastery {
    Weak,
    Improving,
    Strong,
    Mastered,
}

impl fmt::Display for Mastery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mastery::Weak => write!(f, "weak"),
            Mastery::Improving => write!(f, "improving"),
            Mastery::Strong => write!(f, "strong"),
            Mastery::Mastered => write!(f, "mastered"),
        }
    }
}

impl FromStr for Mastery {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weak" => Ok(Mastery::Weak),
            "improving" => Ok(Mastery::Improving),
            "strong" => Ok(Mastery::Strong),
            "mastered" => Ok(Mastery::Mastered),
            other => Err(format!("unknown mastery level: {other}")),
        }
    }
}

/// Direction a focus area has moved since the previous test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Up => write!(f, "up"),
            Trend::Down => write!(f, "down"),
            Trend::Stable => write!(f, "stable"),
        }
    }
}

/// Category of a recurring mistake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MistakeKind {
    Conceptual,
    Calculation,
    TimePressure,
    Guessing,
}

impl fmt::Display for MistakeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MistakeKind::Conceptual => write!(f, "conceptual"),
            MistakeKind::Calculation => write!(f, "calculation"),
            MistakeKind::TimePressure => write!(f, "time-pressure"),
            MistakeKind::Guessing => write!(f, "guessing"),
        }
    }
}

/// One completed exam attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRecord {
    /// Unique identifier for this attempt.
    pub id: String,
    /// Human-readable test name.
    pub name: String,
    /// Day the test was taken.
    pub date: NaiveDate,
    pub total_questions: u32,
    pub attempted: u32,
    pub correct: u32,
    pub incorrect: u32,
    pub skipped: u32,
    /// Achieved score. Negative marking can push this below zero.
    pub score: i32,
    pub max_score: u32,
    /// Minutes actually spent.
    pub time_taken: u32,
    /// Minutes allotted.
    pub total_time: u32,
    /// Per-subject breakdown, in paper order.
    #[serde(default)]
    pub subjects: Vec<SubjectRecord>,
}

/// Per-subject breakdown within a test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectRecord {
    pub name: String,
    pub total_questions: u32,
    pub attempted: u32,
    pub correct: u32,
    pub incorrect: u32,
    pub score: i32,
    pub max_score: u32,
    /// Minutes spent on this subject.
    pub time_taken: u32,
    #[serde(default)]
    pub topics: Vec<TopicRecord>,
}

/// Per-topic breakdown within a subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicRecord {
    pub name: String,
    pub total_questions: u32,
    pub correct: u32,
    pub incorrect: u32,
    /// Accuracy in percent, 0 to 100.
    pub accuracy: f64,
    pub mastery: Mastery,
}

/// One point on the historical score timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub name: String,
    pub date: NaiveDate,
    pub score: i32,
    /// Accuracy in percent, 0 to 100.
    pub accuracy: f64,
    pub total_questions: u32,
}

/// A topic singled out as weak or strong, with its recent movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusArea {
    pub topic: String,
    pub subject: String,
    pub accuracy: f64,
    pub mastery: Mastery,
    pub trend: Trend,
    /// Change in accuracy, in percentage points.
    #[serde(default)]
    pub trend_value: i32,
}

/// A recurring class of mistakes and its share of all mistakes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MistakePattern {
    pub kind: MistakeKind,
    pub label: String,
    pub count: u32,
    pub percentage: f64,
    #[serde(default)]
    pub description: String,
}

/// Everything the metrics are computed from.
///
/// A dataset is always passed explicitly; nothing in this crate keeps one in
/// global state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Human-readable dataset name.
    #[serde(default)]
    pub name: String,
    /// Completed tests, oldest first.
    #[serde(default)]
    pub tests: Vec<TestRecord>,
    /// Score timeline, oldest first.
    #[serde(default)]
    pub progress: Vec<ProgressEntry>,
    #[serde(default)]
    pub weak_areas: Vec<FocusArea>,
    #[serde(default)]
    pub strong_areas: Vec<FocusArea>,
    #[serde(default)]
    pub mistake_patterns: Vec<MistakePattern>,
}

impl Dataset {
    /// Progress scores in timeline order, as regression input.
    pub fn progress_scores(&self) -> Vec<f64> {
        self.progress.iter().map(|p| p.score as f64).collect()
    }
}
