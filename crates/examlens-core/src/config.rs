//! examlens configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::metrics::MetricsConfig;

/// Top-level examlens configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamlensConfig {
    /// Formula constants.
    #[serde(default)]
    pub metrics: MetricsConfig,
    /// Dataset used when none is given on the command line. `None` means the
    /// built-in dataset.
    #[serde(default)]
    pub default_dataset: Option<PathBuf>,
    /// Where `summary --output` writes reports when no directory is given.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./examlens-reports")
}

impl Default for ExamlensConfig {
    fn default() -> Self {
        Self {
            metrics: MetricsConfig::default(),
            default_dataset: None,
            output_dir: default_output_dir(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not expanded again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `examlens.toml` in the current directory
/// 2. `~/.config/examlens/config.toml`
///
/// Environment variable overrides: `EXAMLENS_DATASET`, `EXAMLENS_TARGET_SCORE`.
pub fn load_config_from(path: Option<&Path>) -> Result<ExamlensConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("examlens.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            tracing::debug!("using config {}", path.display());
            toml::from_str::<ExamlensConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ExamlensConfig::default(),
    };

    // Apply env var overrides
    if let Ok(dataset) = std::env::var("EXAMLENS_DATASET") {
        if !dataset.is_empty() {
            config.default_dataset = Some(PathBuf::from(dataset));
        }
    }

    if let Ok(target) = std::env::var("EXAMLENS_TARGET_SCORE") {
        config.metrics.target_score = target
            .trim()
            .parse()
            .with_context(|| format!("invalid EXAMLENS_TARGET_SCORE: '{target}'"))?;
    }

    config.default_dataset = config.default_dataset.as_deref().map(resolve_path);
    config.output_dir = resolve_path(&config.output_dir);

    config
        .metrics
        .validate()
        .context("invalid [metrics] configuration")?;

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("examlens"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_EXAMLENS_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_EXAMLENS_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_EXAMLENS_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("${unterminated"), "${unterminated");
        std::env::remove_var("_EXAMLENS_TEST_VAR");
    }

    #[test]
    fn resolve_env_vars_self_reference() {
        std::env::set_var("_EXAMLENS_LOOP_VAR", "a/${_EXAMLENS_LOOP_VAR}");
        assert_eq!(
            resolve_env_vars("${_EXAMLENS_LOOP_VAR}/b"),
            "a/${_EXAMLENS_LOOP_VAR}/b"
        );
        assert_eq!(resolve_env_vars("${_EXAMLENS_UNSET_VAR}x"), "x");
        std::env::remove_var("_EXAMLENS_LOOP_VAR");
    }

    #[test]
    fn default_config() {
        let config = ExamlensConfig::default();
        assert_eq!(config.metrics, MetricsConfig::default());
        assert!(config.default_dataset.is_none());
        assert_eq!(config.output_dir, PathBuf::from("./examlens-reports"));
    }

    #[test]
    fn parse_partial_metrics_table() {
        let toml_str = r#"
default_dataset = "datasets/jan.toml"

[metrics]
target_score = 220
clamp_efficiency = true
"#;
        let config: ExamlensConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.metrics.target_score, 220);
        assert!(config.metrics.clamp_efficiency);
        assert_eq!(config.metrics.max_score, 300);
        assert!((config.metrics.accuracy_weight - 0.7).abs() < f64::EPSILON);
        assert_eq!(
            config.default_dataset,
            Some(PathBuf::from("datasets/jan.toml"))
        );
    }

    #[test]
    fn load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("examlens.toml");
        std::fs::write(&path, "[metrics]\nclearing_chance_cap = 95\n").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.metrics.clearing_chance_cap, 95);
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(load_config_from(Some(&path)).is_err());
    }

    #[test]
    fn load_rejects_invalid_metrics() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("examlens.toml");
        std::fs::write(&path, "[metrics]\ntarget_score = 400\n").unwrap();

        let err = load_config_from(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("exceeds max_score"));
    }
}
