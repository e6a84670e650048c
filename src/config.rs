//! Configuration management for the adaptive engine
//!
//! TOML-based configuration with defaults and validation.
//! Location: ~/.adaptive-engine/config.toml

use crate::errors::{EngineError, Result};
use crate::learning::prediction::DEFAULT_MAX_RECOMMENDATIONS;
use crate::memory::experience::DEFAULT_MAX_EXPERIENCES;
use crate::memory::patterns::DEFAULT_DISCOVERY_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub learning: LearningConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Learning parameters, fixed for the lifetime of an engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    /// Alpha, in (0, 1]
    pub learning_rate: f64,
    /// Epsilon, in [0, 1]
    pub exploration_rate: f64,
    /// Experience log cap; `None` (settable through the API only) means unbounded
    pub max_experiences: Option<usize>,
    /// Occurrences before a (task, decision) pair becomes a pattern
    pub pattern_threshold: u64,
    /// Pattern recommendations attached to a forecast
    pub max_recommendations: usize,
    /// Seed for the exploration RNG; absent means OS entropy
    pub seed: Option<u64>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Default filter directive, overridden by RUST_LOG
    pub log_level: String,
    /// Emit JSON lines instead of compact text
    pub json: bool,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            exploration_rate: 0.15,
            max_experiences: Some(DEFAULT_MAX_EXPERIENCES),
            pattern_threshold: DEFAULT_DISCOVERY_THRESHOLD,
            max_recommendations: DEFAULT_MAX_RECOMMENDATIONS,
            seed: None,
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}

impl LearningConfig {
    /// Rates only, everything else default
    pub fn with_rates(learning_rate: f64, exploration_rate: f64) -> Self {
        Self {
            learning_rate,
            exploration_rate,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_experiences(mut self, max: Option<usize>) -> Self {
        self.max_experiences = max;
        self
    }

    /// Validate learning parameters
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(EngineError::ConfigError(format!(
                "learning_rate must be in (0, 1], got {}",
                self.learning_rate
            )));
        }

        if !(0.0..=1.0).contains(&self.exploration_rate) {
            return Err(EngineError::ConfigError(format!(
                "exploration_rate must be in [0, 1], got {}",
                self.exploration_rate
            )));
        }

        if self.max_experiences == Some(0) {
            return Err(EngineError::ConfigError(
                "max_experiences must be greater than 0".to_string(),
            ));
        }

        if self.pattern_threshold == 0 {
            return Err(EngineError::ConfigError(
                "pattern_threshold must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

impl EngineConfig {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        match path {
            Some(config_path) => Self::load_from_file(&config_path),
            None => Self::load_default(),
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| EngineError::ConfigError(format!("Failed to read config {}: {}", path.display(), e)))?;

        let config: EngineConfig = toml::from_str(&contents)
            .map_err(|e| EngineError::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load from the standard location if present, otherwise built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(config_path) = Self::default_path() {
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(EngineConfig::default())
    }

    /// Standard configuration path
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".adaptive-engine").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.learning.validate()?;

        if self.telemetry.log_level.trim().is_empty() {
            return Err(EngineError::ConfigError("log_level must not be empty".to_string()));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = self.to_toml()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| EngineError::ConfigError(format!("Failed to create config dir: {}", e)))?;
        }

        std::fs::write(path, contents)
            .map_err(|e| EngineError::ConfigError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Render as pretty TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| EngineError::ConfigError(format!("Failed to serialize config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.learning.learning_rate, 0.1);
        assert_eq!(config.learning.pattern_threshold, 3);
    }

    #[test]
    fn test_learning_rate_bounds() {
        assert!(LearningConfig::with_rates(0.0, 0.1).validate().is_err());
        assert!(LearningConfig::with_rates(1.0, 0.1).validate().is_ok());
        assert!(LearningConfig::with_rates(1.01, 0.1).validate().is_err());
        assert!(LearningConfig::with_rates(f64::NAN, 0.1).validate().is_err());
    }

    #[test]
    fn test_exploration_rate_bounds() {
        assert!(LearningConfig::with_rates(0.1, 0.0).validate().is_ok());
        assert!(LearningConfig::with_rates(0.1, 1.0).validate().is_ok());
        assert!(LearningConfig::with_rates(0.1, -0.1).validate().is_err());
        assert!(LearningConfig::with_rates(0.1, 1.5).validate().is_err());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = LearningConfig::default().with_max_experiences(Some(0));
        assert!(config.validate().is_err());
        let config = LearningConfig::default().with_max_experiences(None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            [learning]
            exploration_rate = 0.0
            seed = 42
            "#,
        )
        .unwrap();

        assert_eq!(config.learning.exploration_rate, 0.0);
        assert_eq!(config.learning.learning_rate, 0.1);
        assert_eq!(config.learning.seed, Some(42));
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn test_toml_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = EngineConfig::default();
        config.learning.learning_rate = 0.25;
        config.telemetry.json = true;
        config.save(&path).unwrap();

        let loaded = EngineConfig::load(Some(path)).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[learning]\nlearning_rate = 2.0\n").unwrap();

        let err = EngineConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(err, EngineError::ConfigError(_)));
    }
}
