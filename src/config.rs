//! Evaluator Configuration

use std::{fs, path::Path};

use serde::Deserialize;
use thiserror::Error;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the configuration file
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse configuration: {0}")]
    Yaml(#[from] serde_norway::Error),
}

/// What the evaluator does when a single discount's strategy fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyErrorPolicy {
    /// Log the failure, leave the line as it was before that discount and carry on.
    #[default]
    Skip,

    /// Abort the evaluation with the strategy's error.
    Fail,
}

/// Evaluator settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvaluatorConfig {
    /// Behaviour when a strategy fails to build or execute
    pub on_strategy_error: StrategyErrorPolicy,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            on_strategy_error: StrategyErrorPolicy::default(),
            log_level: "info".to_string(),
        }
    }
}

impl EvaluatorConfig {
    /// Parse configuration from a YAML document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError::Yaml`] if the document is malformed.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        Ok(serde_norway::from_str(yaml)?)
    }

    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml_str(&contents)
    }

    /// Whether strategy errors abort evaluation
    pub fn fail_fast(&self) -> bool {
        self.on_strategy_error == StrategyErrorPolicy::Fail
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn defaults_skip_and_info() {
        let config = EvaluatorConfig::default();

        assert_eq!(config.on_strategy_error, StrategyErrorPolicy::Skip);
        assert_eq!(config.log_level, "info");
        assert!(!config.fail_fast());
    }

    #[test]
    fn partial_yaml_keeps_defaults() -> TestResult {
        let config = EvaluatorConfig::from_yaml_str("on_strategy_error: fail\n")?;

        assert!(config.fail_fast());
        assert_eq!(config.log_level, "info");

        Ok(())
    }

    #[test]
    fn empty_document_is_default() -> TestResult {
        assert_eq!(EvaluatorConfig::from_yaml_str("")?, EvaluatorConfig::default());

        Ok(())
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let result = EvaluatorConfig::from_yaml_str("on_strategy_error: retry\n");

        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn loads_from_file() -> TestResult {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "on_strategy_error: skip")?;
        writeln!(file, "log_level: debug")?;

        let config = EvaluatorConfig::load(file.path())?;

        assert_eq!(config.on_strategy_error, StrategyErrorPolicy::Skip);
        assert_eq!(config.log_level, "debug");

        Ok(())
    }

    #[test]
    fn missing_file_is_io_error() -> TestResult {
        let dir = tempfile::tempdir()?;

        let result = EvaluatorConfig::load(dir.path().join("missing.yml"));

        assert!(matches!(result, Err(ConfigError::Io(_))));

        Ok(())
    }
}
