//! Line options - decide whether a run is line targeted
//!
//! A run is line targeted when a line was requested and exactly one of the
//! positional arguments looks like a test file. Anything else degrades to a
//! plain run with only the failure reporter active.

use crate::registry::Registry;
use crate::resolver::resolve;
use crate::scanner::scan;
use crate::{FilterError, ResolveError};
use regex::Regex;
use std::path::{Path, PathBuf};

/// Default test file naming convention: `<name>_test` with an optional extension
pub const DEFAULT_TEST_FILE_PATTERN: &str = r"_test(\.[A-Za-z0-9]+)?$";

/// Naming convention used to spot the target file among arguments
#[derive(Debug, Clone)]
pub struct TestFileConvention {
    pattern: Regex,
}

impl TestFileConvention {
    pub fn new(pattern: &str) -> Result<Self, FilterError> {
        let pattern = Regex::new(pattern).map_err(|source| FilterError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { pattern })
    }

    /// Check whether an argument names a test file
    pub fn is_match(&self, arg: &str) -> bool {
        self.pattern.is_match(arg)
    }
}

impl Default for TestFileConvention {
    fn default() -> Self {
        Self {
            pattern: Regex::new(DEFAULT_TEST_FILE_PATTERN).expect("default pattern is valid"),
        }
    }
}

/// Pick the target file among positional arguments
///
/// Returns `None` unless exactly one argument matches the convention.
pub fn detect_target_file<S: AsRef<str>>(
    args: &[S],
    convention: &TestFileConvention,
) -> Option<PathBuf> {
    let matches: Vec<&str> = args
        .iter()
        .map(AsRef::as_ref)
        .filter(|arg| convention.is_match(arg))
        .collect();

    match matches.as_slice() {
        [file] => Some(PathBuf::from(file)),
        other => {
            tracing::debug!(count = other.len(), "no single test file among arguments");
            None
        }
    }
}

/// Options controlling line-targeted execution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineOptions {
    /// Requested line (`-l/--line N`)
    pub line: Option<u32>,
    /// Target file detected from arguments
    pub file: Option<PathBuf>,
}

/// What the host should do for this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinePlan {
    /// Run only tests matching this filter expression
    Filter(String),
    /// Run unfiltered with the failure reporter active
    ReportOnly,
}

impl LineOptions {
    /// Build options from the requested line and the raw positional arguments
    pub fn from_args<S: AsRef<str>>(
        line: Option<u32>,
        args: &[S],
        convention: &TestFileConvention,
    ) -> Self {
        Self {
            line,
            file: detect_target_file(args, convention),
        }
    }

    /// Resolve these options against a registry
    ///
    /// Relative target files and recorded locations are both taken
    /// relative to `cwd`. Fails when the requested line precedes every
    /// test in the file.
    pub fn plan(&self, registry: &Registry, cwd: &Path) -> Result<LinePlan, ResolveError> {
        let (Some(line), Some(file)) = (self.line, self.file.as_deref()) else {
            tracing::debug!(line = ?self.line, file = ?self.file, "line targeting disabled");
            return Ok(LinePlan::ReportOnly);
        };

        let candidates = scan(registry, file, cwd);
        resolve(&candidates, line).map(LinePlan::Filter)
    }
}
