//! testline configuration
//!
//! Loads `testline.toml` and environment overrides.
//!
//! # Configuration Hierarchy
//!
//! Configuration is merged in the following order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Project config (`testline.toml`, searched upward from the working directory)
//! 3. Environment variables (`TESTLINE_*`)
//! 4. CLI flags (handled by the caller)
//!
//! # Example
//!
//! ```no_run
//! use testline_config::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::new().load_from_directory(Path::new(".")).unwrap();
//! println!("{}", config.rerun_prefix());
//! ```

pub mod loader;
pub mod project;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// File name searched for when loading project configuration
pub const CONFIG_FILE_NAME: &str = "testline.toml";

// Re-export main types
pub use loader::{Config, ConfigLoader};
pub use project::ProjectConfig;
