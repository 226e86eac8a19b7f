//! Configuration for the transpiler.
//!
//! Configuration precedence (highest to lowest):
//! 1. Environment variables (`QBRIDGE_` prefix)
//! 2. Configuration file (YAML)
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::options::DEFAULT_ATOL;
use qbridge_synth::{DEFAULT_MAX_QUBITS, MAX_DENSE_QUBITS};

/// Largest oracle ceiling a configuration may request.
pub const MAX_ORACLE_QUBITS: u32 = MAX_DENSE_QUBITS;

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Defaults for transpile options.
    #[serde(default)]
    pub transpile: TranspileConfig,

    /// Equivalence oracle settings.
    #[serde(default)]
    pub oracle: OracleConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Transpile defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranspileConfig {
    /// Compress qubit indices after decoding.
    #[serde(default)]
    pub ensure_contiguous: bool,

    /// Reverse the compressed order.
    #[serde(default)]
    pub reverse_qubits: bool,

    /// Near-equality tolerance.
    #[serde(default = "default_atol")]
    pub atol: f64,
}

/// Equivalence oracle settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Widest circuit multiplied out densely.
    #[serde(default = "default_max_qubits")]
    pub max_qubits: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive, e.g. `info` or `qbridge_synth=debug`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "console" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_atol() -> f64 {
    DEFAULT_ATOL
}

fn default_max_qubits() -> u32 {
    DEFAULT_MAX_QUBITS
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "console".to_string()
}

impl Default for TranspileConfig {
    fn default() -> Self {
        Self {
            ensure_contiguous: false,
            reverse_qubits: false,
            atol: default_atol(),
        }
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            max_qubits: default_max_qubits(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml_ng::from_str(contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Config::default().merge_env(|key| std::env::var(key).ok())
    }

    /// Load configuration with the following precedence:
    /// 1. Load from file if provided
    /// 2. Apply environment variable overrides
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Config::default(),
        };
        let config = config.merge_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Override fields from variables that `lookup` finds. Unparseable
    /// numeric and boolean values are ignored.
    fn merge_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        // Transpile
        if let Some(v) = lookup("QBRIDGE_ENSURE_CONTIGUOUS").and_then(|v| parse_bool(&v)) {
            self.transpile.ensure_contiguous = v;
        }
        if let Some(v) = lookup("QBRIDGE_REVERSE_QUBITS").and_then(|v| parse_bool(&v)) {
            self.transpile.reverse_qubits = v;
        }
        if let Some(v) = lookup("QBRIDGE_ATOL").and_then(|v| v.parse().ok()) {
            self.transpile.atol = v;
        }

        // Oracle
        if let Some(v) = lookup("QBRIDGE_MAX_QUBITS").and_then(|v| v.parse().ok()) {
            self.oracle.max_qubits = v;
        }

        // Logging
        if let Some(v) = lookup("QBRIDGE_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = lookup("QBRIDGE_LOG_FORMAT") {
            self.logging.format = v;
        }

        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let atol = self.transpile.atol;
        if !atol.is_finite() || atol <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "atol must be positive and finite, got {atol}"
            )));
        }

        let max_qubits = self.oracle.max_qubits;
        if !(1..=MAX_ORACLE_QUBITS).contains(&max_qubits) {
            return Err(ConfigError::ValidationError(format!(
                "max_qubits must be between 1 and {MAX_ORACLE_QUBITS}, got {max_qubits}"
            )));
        }

        match self.logging.format.as_str() {
            "console" | "json" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log format: {other}"
                )));
            }
        }

        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn fake_env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.transpile.ensure_contiguous);
        assert_eq!(config.transpile.atol, 1e-7);
        assert_eq!(config.oracle.max_qubits, 12);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml("transpile:\n  ensure_contiguous: true\n").unwrap();
        assert!(config.transpile.ensure_contiguous);
        assert_eq!(config.transpile.atol, 1e-7);
        assert_eq!(config.logging.format, "console");
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default().merge_env(fake_env(&[
            ("QBRIDGE_REVERSE_QUBITS", "yes"),
            ("QBRIDGE_ATOL", "1e-9"),
            ("QBRIDGE_MAX_QUBITS", "not-a-number"),
            ("QBRIDGE_LOG_FORMAT", "json"),
        ]));
        assert!(config.transpile.reverse_qubits);
        assert_eq!(config.transpile.atol, 1e-9);
        assert_eq!(config.oracle.max_qubits, 12);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_validation() {
        let mut config = Config::default();
        config.transpile.atol = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.oracle.max_qubits = MAX_ORACLE_QUBITS + 1;
        assert!(config.validate().is_err());
        config.oracle.max_qubits = MAX_ORACLE_QUBITS;
        assert!(config.validate().is_ok());

        let mut config = Config::default();
        config.logging.format = "xml".into();
        assert!(config.validate().is_err());

        assert!(matches!(
            Config::from_yaml("oracle:\n  max_qubits: 0\n"),
            Err(ConfigError::ValidationError(_))
        ));
        assert!(matches!(
            Config::from_yaml("transpile: [1, 2"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qbridge.yaml");
        std::fs::write(&path, "oracle:\n  max_qubits: 10\nlogging:\n  level: debug\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.oracle.max_qubits, 10);
        assert_eq!(config.logging.level, "debug");

        assert!(matches!(
            Config::from_file(dir.path().join("missing.yaml")),
            Err(ConfigError::IoError(_))
        ));
    }

    #[test]
    fn test_load_without_file_is_valid() {
        let config = Config::load(None).unwrap();
        assert!(config.validate().is_ok());
    }
}
