//! examlens-core — Data model, validation and derived exam metrics.
//!
//! This crate defines the exam-history data model, loads and validates
//! datasets, and computes the dashboard metrics (accuracy, score prediction,
//! clearing chance, study efficiency) from a dataset passed in by the caller.

pub mod config;
pub mod error;
pub mod fixtures;
pub mod metrics;
pub mod model;
pub mod parser;
pub mod report;
pub mod statistics;

pub use error::{DatasetError, MetricsError};
pub use metrics::{MetricsConfig, ScorePrediction};
pub use model::Dataset;
