//! Line-targeted test selection and rerun reporting
//!
//! Provides the two pieces a host test harness needs to support
//! `-l/--line N` style invocations:
//! - Scanning a registry for every test (or test group) defined in a file
//!   and resolving a line number to the one test that owns it
//! - Collecting failed results during a run and printing a rerun command
//!   for each of them at the end
//!
//! The host engine owns registration and execution. This crate only reads
//! the [`Registry`] it is handed and the [`TestOutcome`]s it is fed.
//!
//! # Example
//!
//! ```
//! use testline_core::{resolve, scan, Registry, SourceLocation};
//! use std::path::Path;
//!
//! let mut registry = Registry::new();
//! registry.define_case(Some("CalcTest"), "test_adds", Some(SourceLocation::new("/p/calc_test.rb", 5)));
//! registry.define_case(Some("CalcTest"), "test_subtracts", Some(SourceLocation::new("/p/calc_test.rb", 12)));
//!
//! let candidates = scan(&registry, Path::new("/p/calc_test.rb"), Path::new("/p"));
//! assert_eq!(resolve(&candidates, 8).unwrap(), "CalcTest#test_adds");
//! ```

pub mod filter;
pub mod options;
pub mod outcome;
pub mod registry;
pub mod reporter;
pub mod resolver;
pub mod scanner;

use std::path::PathBuf;
use thiserror::Error;

/// Line resolution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The requested line precedes every known test start in the file
    #[error("could not find a test starting at or before line {line}")]
    NoMatch { line: u32 },
}

/// Filter expression errors
#[derive(Error, Debug)]
pub enum FilterError {
    #[error("invalid filter pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Errors raised while reading host-provided registry manifests and results
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid registry manifest: {0}")]
    InvalidManifest(#[source] serde_json::Error),

    #[error("invalid result on line {line}: {source}")]
    InvalidResult {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

// Re-export main types
pub use filter::Filter;
pub use options::{detect_target_file, LineOptions, LinePlan, TestFileConvention};
pub use outcome::{parse_outcomes, Origin, Status, TestOutcome};
pub use registry::{CaseKey, Registry, RegistryManifest, Runnable, SourceLocation, StackFrame};
pub use reporter::FailureReporter;
pub use resolver::resolve;
pub use scanner::{scan, Candidate};
