//! Configuration management for Parapet
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. Environment variables (PARAPET_* prefix, highest precedence)
//! 2. parapet.local.toml (gitignored, local overrides)
//! 3. parapet.toml (git-tracked, project config)
//! 4. ~/.config/parapet/config.toml (user defaults)
//! 5. Built-in defaults (lowest precedence)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::Paths;

/// Main Parapet configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParapetConfig {
    pub project: ProjectConfig,
    pub logging: LoggingConfig,
    pub enforcement: EnforcementConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "parapet".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, e.g. `info` or `info,parapet_guard=debug`.
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Full,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Full => "full",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnforcementConfig {
    /// Log every policy gate and instance check decision.
    pub audit_decisions: bool,
    /// Log the names of fields removed by the visibility filter.
    pub log_stripped_fields: bool,
}

impl Default for EnforcementConfig {
    fn default() -> Self {
        Self {
            audit_decisions: true,
            log_stripped_fields: false,
        }
    }
}

impl ParapetConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        ConfigLoader::new().load()
    }

    /// Load configuration from specific project directory
    pub fn load_from_dir(project_dir: impl AsRef<Path>) -> Result<Self> {
        ConfigLoader::new().with_project_dir(project_dir).load()
    }

    /// Read a single TOML file, without merging other sources
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Render as TOML, e.g. to seed a project's parapet.toml
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Create a development configuration
    pub fn development() -> Self {
        Self {
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: LogFormat::Pretty,
            },
            enforcement: EnforcementConfig {
                audit_decisions: true,
                log_stripped_fields: true,
            },
            ..Default::default()
        }
    }

    /// Create a production configuration
    pub fn production() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                format: LogFormat::Full,
            },
            enforcement: EnforcementConfig {
                audit_decisions: true,
                log_stripped_fields: false,
            },
            ..Default::default()
        }
    }

    /// Check values the type system cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.project.name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "project.name must not be empty".to_string(),
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "logging.level must not be empty".to_string(),
            ));
        }

        // Same parser telemetry initialization uses
        tracing_subscriber::EnvFilter::try_new(&self.logging.level).map_err(|e| {
            ConfigError::ValidationError(format!("invalid logging.level filter: {e}"))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use test_case::test_case;

    #[test]
    fn test_default_config() {
        let config = ParapetConfig::default();
        assert_eq!(config.project.name, "parapet");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert!(config.enforcement.audit_decisions);
        assert!(!config.enforcement.log_stripped_fields);
    }

    #[test]
    fn test_development_config() {
        let config = ParapetConfig::development();
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.enforcement.log_stripped_fields);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_production_config() {
        let config = ParapetConfig::production();
        assert_eq!(config.logging.level, "info");
        assert!(!config.enforcement.log_stripped_fields);
        assert!(config.validate().is_ok());
    }

    #[test_case("info"; "bare level")]
    #[test_case("WARN"; "upper case")]
    #[test_case("info,parapet_guard=debug"; "directives")]
    #[test_case("off"; "off")]
    #[test_case("parapet_guard"; "bare target")]
    #[test_case("info,"; "trailing comma")]
    fn test_valid_levels(level: &str) {
        let mut config = ParapetConfig::default();
        config.logging.level = level.to_string();
        assert!(config.validate().is_ok());
    }

    #[test_case("info,parapet=chatty"; "unknown directive level")]
    #[test_case("parapet_guard=loud"; "unknown target level")]
    #[test_case(""; "empty")]
    fn test_invalid_levels(level: &str) {
        let mut config = ParapetConfig::default();
        config.logging.level = level.to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_empty_project_name_is_invalid() {
        let mut config = ParapetConfig::default();
        config.project.name = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_logging_section_has_only_telemetry_keys() {
        let rendered = ParapetConfig::default().to_toml().unwrap();
        let parsed: toml::Table = toml::from_str(&rendered).unwrap();
        let mut keys: Vec<&str> = parsed["logging"]
            .as_table()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        keys.sort_unstable();

        assert_eq!(keys, ["format", "level"]);
    }

    #[test]
    fn test_toml_file_round_trip() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let path = temp_dir.path().join("parapet.toml");

        let config = ParapetConfig::development();
        std::fs::write(&path, config.to_toml().unwrap()).unwrap();

        assert_eq!(ParapetConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_from_file_errors() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let missing = temp_dir.path().join("missing.toml");
        assert!(matches!(
            ParapetConfig::from_file(&missing),
            Err(ConfigError::ReadError { .. })
        ));

        let broken = temp_dir.path().join("broken.toml");
        std::fs::write(&broken, "[logging\nlevel = ").unwrap();
        assert!(matches!(
            ParapetConfig::from_file(&broken),
            Err(ConfigError::ParseError { .. })
        ));
    }
}
