//! Headline performance metrics.
//!
//! Overall accuracy, score prediction, clearing chance and study efficiency,
//! computed from records passed in by the caller. Every function here is pure
//! and returns a [`MetricsError`] instead of a NaN when the input is
//! degenerate.

use serde::{Deserialize, Serialize};

use crate::error::MetricsError;
use crate::model::{ProgressEntry, TestRecord};
use crate::statistics::linear_fit;

/// Constants for the prediction and efficiency formulas.
///
/// The defaults are the business rules the dashboard has always used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Weight of answer accuracy in the efficiency blend.
    pub accuracy_weight: f64,
    /// Weight of time utilisation in the efficiency blend.
    pub time_weight: f64,
    /// Passing cutoff the clearing chance is measured against.
    pub target_score: u32,
    /// Highest attainable score; predictions never exceed it.
    pub max_score: u32,
    /// Upper bound on the reported clearing chance, in percent.
    pub clearing_chance_cap: u32,
    /// Cap study efficiency at 100 when a test is finished early.
    pub clamp_efficiency: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            accuracy_weight: 0.7,
            time_weight: 0.3,
            target_score: 200,
            max_score: 300,
            clearing_chance_cap: 98,
            clamp_efficiency: false,
        }
    }
}

impl MetricsConfig {
    /// Check the constants are usable.
    pub fn validate(&self) -> Result<(), MetricsError> {
        for (name, value) in [
            ("accuracy_weight", self.accuracy_weight),
            ("time_weight", self.time_weight),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(MetricsError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if self.target_score == 0 {
            return Err(MetricsError::InvalidConfig(
                "target_score must be greater than zero".into(),
            ));
        }
        if self.max_score == 0 {
            return Err(MetricsError::InvalidConfig(
                "max_score must be greater than zero".into(),
            ));
        }
        if self.target_score > self.max_score {
            return Err(MetricsError::InvalidConfig(format!(
                "target_score ({}) exceeds max_score ({})",
                self.target_score, self.max_score
            )));
        }
        if self.clearing_chance_cap > 100 {
            return Err(MetricsError::InvalidConfig(format!(
                "clearing_chance_cap must be at most 100, got {}",
                self.clearing_chance_cap
            )));
        }
        Ok(())
    }
}

/// Projected next score and the chance of clearing the cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorePrediction {
    pub predicted: i32,
    /// Percent, never above the configured cap.
    pub clearing_chance: u32,
    pub target_score: u32,
}

/// The most recent test.
pub fn latest_test(tests: &[TestRecord]) -> Result<&TestRecord, MetricsError> {
    tests.last().ok_or(MetricsError::NoDataAvailable)
}

/// Rounded percentage of attempted questions answered correctly in the
/// latest test.
pub fn overall_accuracy(tests: &[TestRecord]) -> Result<u32, MetricsError> {
    let latest = latest_test(tests)?;
    Ok(accuracy_percent(latest)?.round() as u32)
}

/// Extrapolate the score timeline one step past its last entry.
///
/// The timeline is fitted against its index positions, not its dates, and is
/// read in the order given.
pub fn score_prediction(
    progress: &[ProgressEntry],
    config: &MetricsConfig,
) -> Result<ScorePrediction, MetricsError> {
    if progress.is_empty() {
        return Err(MetricsError::NoDataAvailable);
    }
    let scores: Vec<f64> = progress.iter().map(|p| p.score as f64).collect();
    let fit = linear_fit(&scores).ok_or(MetricsError::InsufficientHistory {
        found: progress.len(),
        required: 2,
    })?;

    let next = fit.at(scores.len() as f64);
    let predicted = next.min(config.max_score as f64).round() as i32;

    let chance = (predicted as f64 / config.target_score as f64 * 100.0)
        .min(config.clearing_chance_cap as f64)
        .max(0.0)
        .round() as u32;

    tracing::debug!(
        slope = fit.slope,
        intercept = fit.intercept,
        predicted,
        clearing_chance = chance,
        "score prediction"
    );

    Ok(ScorePrediction {
        predicted,
        clearing_chance: chance,
        target_score: config.target_score,
    })
}

/// Weighted blend of accuracy and pacing on the latest test.
///
/// Pacing is allotted time over time taken, so finishing early pushes it
/// above 100. The blend is left unbounded unless `clamp_efficiency` is set.
pub fn study_efficiency(tests: &[TestRecord], config: &MetricsConfig) -> Result<u32, MetricsError> {
    let latest = latest_test(tests)?;
    let accuracy = accuracy_percent(latest)?;
    if latest.time_taken == 0 {
        return Err(MetricsError::NoTimeRecorded {
            test_id: latest.id.clone(),
        });
    }
    let time_efficiency = latest.total_time as f64 / latest.time_taken as f64 * 100.0;

    let mut efficiency =
        accuracy * config.accuracy_weight + time_efficiency * config.time_weight;
    if config.clamp_efficiency {
        efficiency = efficiency.min(100.0);
    }

    tracing::debug!(accuracy, time_efficiency, efficiency, "study efficiency");
    Ok(efficiency.round() as u32)
}

fn accuracy_percent(test: &TestRecord) -> Result<f64, MetricsError> {
    if test.attempted == 0 {
        return Err(MetricsError::NoAttempts {
            test_id: test.id.clone(),
        });
    }
    Ok(test.correct as f64 / test.attempted as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::builtin_dataset;
    use chrono::NaiveDate;

    fn entry(i: u32, score: i32) -> ProgressEntry {
        ProgressEntry {
            name: format!("Test {i}"),
            date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap() + chrono::Days::new(i as u64),
            score,
            accuracy: 50.0,
            total_questions: 90,
        }
    }

    fn history(scores: &[i32]) -> Vec<ProgressEntry> {
        scores
            .iter()
            .enumerate()
            .map(|(i, &s)| entry(i as u32, s))
            .collect()
    }

    #[test]
    fn latest_test_is_last() {
        let dataset = builtin_dataset().unwrap();
        assert_eq!(latest_test(&dataset.tests).unwrap().id, "test-3");
    }

    #[test]
    fn latest_test_empty() {
        assert_eq!(latest_test(&[]), Err(MetricsError::NoDataAvailable));
    }

    #[test]
    fn overall_accuracy_fixture() {
        let dataset = builtin_dataset().unwrap();
        // 64 / 85
        assert_eq!(overall_accuracy(&dataset.tests).unwrap(), 75);
    }

    #[test]
    fn overall_accuracy_no_attempts() {
        let mut tests = builtin_dataset().unwrap().tests;
        let last = tests.last_mut().unwrap();
        last.attempted = 0;
        last.correct = 0;
        assert_eq!(
            overall_accuracy(&tests),
            Err(MetricsError::NoAttempts {
                test_id: "test-3".into()
            })
        );
    }

    #[test]
    fn prediction_fixture() {
        let dataset = builtin_dataset().unwrap();
        let prediction = score_prediction(&dataset.progress, &MetricsConfig::default()).unwrap();
        assert!(prediction.predicted > 235);
        assert_eq!(prediction.predicted, 245);
        assert_eq!(prediction.clearing_chance, 98);
        assert_eq!(prediction.target_score, 200);
    }

    #[test]
    fn prediction_is_capped_at_max_score() {
        let steep = history(&[100, 200, 300, 400]);
        let prediction = score_prediction(&steep, &MetricsConfig::default()).unwrap();
        assert_eq!(prediction.predicted, 300);
        assert_eq!(prediction.clearing_chance, 98);
    }

    #[test]
    fn clearing_chance_below_cap() {
        let flat = history(&[150, 150, 150]);
        let prediction = score_prediction(&flat, &MetricsConfig::default()).unwrap();
        assert_eq!(prediction.predicted, 150);
        assert_eq!(prediction.clearing_chance, 75);
    }

    #[test]
    fn clearing_chance_never_negative() {
        let falling = history(&[60, 20, -20]);
        let prediction = score_prediction(&falling, &MetricsConfig::default()).unwrap();
        assert_eq!(prediction.predicted, -60);
        assert_eq!(prediction.clearing_chance, 0);
    }

    #[test]
    fn prediction_respects_custom_cutoff() {
        let config = MetricsConfig {
            target_score: 250,
            clearing_chance_cap: 90,
            ..MetricsConfig::default()
        };
        let prediction = score_prediction(&history(&[150, 150]), &config).unwrap();
        assert_eq!(prediction.clearing_chance, 60);
        assert_eq!(prediction.target_score, 250);
    }

    #[test]
    fn prediction_empty_history() {
        assert_eq!(
            score_prediction(&[], &MetricsConfig::default()),
            Err(MetricsError::NoDataAvailable)
        );
    }

    #[test]
    fn prediction_single_point() {
        assert_eq!(
            score_prediction(&history(&[235]), &MetricsConfig::default()),
            Err(MetricsError::InsufficientHistory {
                found: 1,
                required: 2
            })
        );
    }

    #[test]
    fn study_efficiency_fixture() {
        let dataset = builtin_dataset().unwrap();
        // round(75.29 * 0.7 + 104.65 * 0.3)
        assert_eq!(
            study_efficiency(&dataset.tests, &MetricsConfig::default()).unwrap(),
            84
        );
    }

    #[test]
    fn study_efficiency_unbounded_by_default() {
        let mut tests = builtin_dataset().unwrap().tests;
        let last = tests.last_mut().unwrap();
        last.correct = last.attempted;
        last.incorrect = 0;
        last.time_taken = 60;
        // 100 * 0.7 + 300 * 0.3
        assert_eq!(study_efficiency(&tests, &MetricsConfig::default()).unwrap(), 160);

        let clamped = MetricsConfig {
            clamp_efficiency: true,
            ..MetricsConfig::default()
        };
        assert_eq!(study_efficiency(&tests, &clamped).unwrap(), 100);
    }

    #[test]
    fn study_efficiency_no_time() {
        let mut tests = builtin_dataset().unwrap().tests;
        tests.last_mut().unwrap().time_taken = 0;
        assert!(matches!(
            study_efficiency(&tests, &MetricsConfig::default()),
            Err(MetricsError::NoTimeRecorded { .. })
        ));
    }

    #[test]
    fn metrics_are_idempotent() {
        let dataset = builtin_dataset().unwrap();
        let config = MetricsConfig::default();
        let first = (
            overall_accuracy(&dataset.tests),
            score_prediction(&dataset.progress, &config),
            study_efficiency(&dataset.tests, &config),
        );
        for _ in 0..5 {
            let again = (
                overall_accuracy(&dataset.tests),
                score_prediction(&dataset.progress, &config),
                study_efficiency(&dataset.tests, &config),
            );
            assert_eq!(first, again);
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(MetricsConfig::default().validate().is_ok());
    }

    #[test]
    fn config_rejects_bad_values() {
        let negative = MetricsConfig {
            time_weight: -0.1,
            ..MetricsConfig::default()
        };
        assert!(negative.validate().is_err());

        let nan = MetricsConfig {
            accuracy_weight: f64::NAN,
            ..MetricsConfig::default()
        };
        assert!(nan.validate().is_err());

        let unreachable = MetricsConfig {
            target_score: 350,
            ..MetricsConfig::default()
        };
        assert!(unreachable.validate().is_err());

        let over_cap = MetricsConfig {
            clearing_chance_cap: 120,
            ..MetricsConfig::default()
        };
        assert!(over_cap.validate().is_err());
    }
}
