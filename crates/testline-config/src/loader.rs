//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::project::{validate_pattern, validate_prefix, ProjectConfig};
use crate::{ConfigResult, CONFIG_FILE_NAME};
use std::env;
use std::path::{Path, PathBuf};

/// Rerun prefix used when nothing else is configured
pub const DEFAULT_RERUN_PREFIX: &str = "run";

/// Configuration loader
///
/// Loads configuration and merges it with proper precedence:
/// 1. Project config (testline.toml) - lowest priority
/// 2. Environment variables (TESTLINE_*) - overrides project
/// 3. CLI flags - highest priority (handled by caller)
#[derive(Debug, Default)]
pub struct ConfigLoader;

/// Merged configuration result
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Project configuration
    pub project: ProjectConfig,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find testline.toml, then applies
    /// environment overrides.
    pub fn load_from_directory(&self, start_dir: &Path) -> ConfigResult<Config> {
        let (project_root, project_config) = self.find_project_config(start_dir)?;
        let project_config = self.apply_env_overrides(project_config)?;

        tracing::debug!(root = ?project_root, "loaded configuration");

        Ok(Config {
            project: project_config,
        })
    }

    /// Find project configuration by walking up directory tree
    fn find_project_config(
        &self,
        start_dir: &Path,
    ) -> ConfigResult<(Option<PathBuf>, ProjectConfig)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);

            if config_path.exists() {
                let project_config = ProjectConfig::load_from_file(&config_path)?;
                return Ok((Some(current), project_config));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok((None, ProjectConfig::default())),
            }
        }
    }

    /// Apply environment variable overrides to project config
    ///
    /// Environment variables follow the pattern: TESTLINE_<SECTION>_<KEY>
    fn apply_env_overrides(&self, mut config: ProjectConfig) -> ConfigResult<ProjectConfig> {
        if let Ok(prefix) = env::var("TESTLINE_RERUN_PREFIX") {
            validate_prefix(&prefix)?;
            config.rerun.get_or_insert_with(Default::default).prefix = Some(prefix);
        }

        if let Ok(pattern) = env::var("TESTLINE_TEST_FILE_PATTERN") {
            validate_pattern(&pattern)?;
            config
                .discovery
                .get_or_insert_with(Default::default)
                .test_file_pattern = Some(pattern);
        }

        Ok(config)
    }
}

impl Config {
    /// Get the effective rerun prefix (config > default)
    pub fn rerun_prefix(&self) -> &str {
        self.project.prefix().unwrap_or(DEFAULT_RERUN_PREFIX)
    }

    /// Get the configured test file pattern, if any
    pub fn test_file_pattern(&self) -> Option<&str> {
        self.project.test_file_pattern()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn create_config_file(dir: &Path, content: &str) -> PathBuf {
        let config_path = dir.join(CONFIG_FILE_NAME);
        fs::write(&config_path, content).unwrap();
        config_path
    }

    fn clear_env() {
        env::remove_var("TESTLINE_RERUN_PREFIX");
        env::remove_var("TESTLINE_TEST_FILE_PATTERN");
    }

    #[test]
    #[serial]
    fn test_load_project_config() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        create_config_file(temp_dir.path(), "[rerun]\nprefix = \"ruby -Itest\"\n");

        let config = ConfigLoader::new().load_from_directory(temp_dir.path()).unwrap();

        assert_eq!(config.rerun_prefix(), "ruby -Itest");
    }

    #[test]
    #[serial]
    fn test_find_config_in_parent() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        create_config_file(temp_dir.path(), "[rerun]\nprefix = \"bin/test\"\n");

        let sub_dir = temp_dir.path().join("test").join("models");
        fs::create_dir_all(&sub_dir).unwrap();

        let config = ConfigLoader::new().load_from_directory(&sub_dir).unwrap();
        assert_eq!(config.rerun_prefix(), "bin/test");
    }

    #[test]
    #[serial]
    fn test_env_overrides_project() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        create_config_file(temp_dir.path(), "[rerun]\nprefix = \"ruby\"\n");

        env::set_var("TESTLINE_RERUN_PREFIX", "bundle exec ruby");
        env::set_var("TESTLINE_TEST_FILE_PATTERN", r"_spec\.rb$");
        let config = ConfigLoader::new().load_from_directory(temp_dir.path());
        clear_env();

        let config = config.unwrap();
        assert_eq!(config.rerun_prefix(), "bundle exec ruby");
        assert_eq!(config.test_file_pattern(), Some(r"_spec\.rb$"));
    }

    #[test]
    #[serial]
    fn test_invalid_env_pattern_is_an_error() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();

        env::set_var("TESTLINE_TEST_FILE_PATTERN", "(");
        let result = ConfigLoader::new().load_from_directory(temp_dir.path());
        clear_env();

        assert!(result.is_err());
    }
    #[test]
    #[serial]
    fn test_nearest_config_wins() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        create_config_file(temp_dir.path(), "[rerun]\nprefix = \"ruby\"\n");
        let sub_dir = temp_dir.path().join("engine");
        fs::create_dir_all(&sub_dir).unwrap();
        create_config_file(&sub_dir, "[discovery]\ntest_file_pattern = \"_check$\"\n");

        let config = ConfigLoader::new().load_from_directory(&sub_dir).unwrap();
        assert_eq!(config.test_file_pattern(), Some("_check$"));
        assert_eq!(config.rerun_prefix(), DEFAULT_RERUN_PREFIX);
    }
}
