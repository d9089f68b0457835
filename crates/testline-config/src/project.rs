//! Project Configuration (testline.toml)

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Project configuration from testline.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Rerun command settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rerun: Option<RerunConfig>,

    /// Test file detection settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovery: Option<DiscoveryConfig>,
}

/// Rerun command configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct RerunConfig {
    /// Invocation prefix of every rerun line (e.g. "ruby", "bin/test")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

/// Test file detection configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct DiscoveryConfig {
    /// Regex a positional argument must match to count as a test file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_file_pattern: Option<String>,
}

impl ProjectConfig {
    /// Load project configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the project configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(prefix) = self.prefix() {
            validate_prefix(prefix)?;
        }
        if let Some(pattern) = self.test_file_pattern() {
            validate_pattern(pattern)?;
        }
        Ok(())
    }

    /// Get the rerun prefix, if present
    pub fn prefix(&self) -> Option<&str> {
        self.rerun.as_ref().and_then(|r| r.prefix.as_deref())
    }

    /// Get the test file pattern, if present
    pub fn test_file_pattern(&self) -> Option<&str> {
        self.discovery
            .as_ref()
            .and_then(|d| d.test_file_pattern.as_deref())
    }
}

pub(crate) fn validate_prefix(prefix: &str) -> ConfigResult<()> {
    if prefix.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "rerun.prefix".to_string(),
            reason: "prefix cannot be empty".to_string(),
        });
    }
    Ok(())
}

pub(crate) fn validate_pattern(pattern: &str) -> ConfigResult<()> {
    regex::Regex::new(pattern).map_err(|e| ConfigError::InvalidValue {
        field: "discovery.test_file_pattern".to_string(),
        reason: e.to_string(),
    })?;
    Ok(())
}
