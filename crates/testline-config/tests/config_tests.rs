//! Configuration loading and precedence tests

use rstest::rstest;
use serial_test::serial;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use testline_config::{ConfigError, ConfigLoader, ProjectConfig, CONFIG_FILE_NAME};

fn create_config_file(dir: &Path, content: &str) -> std::path::PathBuf {
    let config_path = dir.join(CONFIG_FILE_NAME);
    fs::write(&config_path, content).unwrap();
    config_path
}

// ============================================================================
// Config Loading Tests
// ============================================================================

#[test]
#[serial]
fn test_defaults_without_config_file() {
    std::env::remove_var("TESTLINE_RERUN_PREFIX");
    std::env::remove_var("TESTLINE_TEST_FILE_PATTERN");
    let temp_dir = TempDir::new().unwrap();

    let config = ConfigLoader::new().load_from_directory(temp_dir.path()).unwrap();

    assert!(config.project.rerun.is_none());
    assert!(config.project.discovery.is_none());
    assert_eq!(config.rerun_prefix(), "run");
    assert_eq!(config.test_file_pattern(), None);
}

#[rstest]
#[case("[rerun]\nprefix = \"\"\n")]
#[case("[discovery]\ntest_file_pattern = \"[unclosed\"\n")]
#[serial]
fn test_invalid_values_rejected(#[case] content: &str) {
    std::env::remove_var("TESTLINE_RERUN_PREFIX");
    std::env::remove_var("TESTLINE_TEST_FILE_PATTERN");
    let temp_dir = TempDir::new().unwrap();
    create_config_file(temp_dir.path(), content);

    let err = ConfigLoader::new()
        .load_from_directory(temp_dir.path())
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
}

#[test]
#[serial]
fn test_malformed_toml_names_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_config_file(temp_dir.path(), "[rerun\nprefix = ");

    let err = ConfigLoader::new()
        .load_from_directory(temp_dir.path())
        .unwrap_err();
    assert!(matches!(err, ConfigError::TomlParseError { .. }));
    assert!(err.to_string().contains(CONFIG_FILE_NAME));
}

#[test]
fn test_missing_file_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let err = ProjectConfig::load_from_file(&temp_dir.path().join(CONFIG_FILE_NAME)).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(_)));
}
