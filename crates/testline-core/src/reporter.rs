//! Failure reporter - print a rerun command for every failed test
//!
//! Results are collected while the run is in progress. Reporting consumes
//! the reporter, so a finished report can neither collect nor print again.

use crate::outcome::TestOutcome;
use crate::registry::Registry;
use colored::*;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};

/// Header printed above the rerun commands
pub const HEADER: &str = "Focus on failing tests:";

/// Collects failed results and reports them as rerun commands
pub struct FailureReporter<'r> {
    registry: &'r Registry,
    /// Command prefix of every rerun line (e.g. `ruby`)
    prefix: String,
    /// Directory rerun paths are made relative to
    cwd: PathBuf,
    /// Wrap rerun lines in color escapes
    color: bool,
    failures: Vec<TestOutcome>,
}

impl<'r> FailureReporter<'r> {
    /// Create a reporter in the collecting state
    pub fn new(registry: &'r Registry, prefix: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            prefix: prefix.into(),
            cwd: cwd.into(),
            color: false,
            failures: Vec::new(),
        }
    }

    /// Enable or disable colored rerun lines
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Record a completed result; passes and skips are ignored
    pub fn record(&mut self, outcome: TestOutcome) {
        if outcome.status.is_failure() {
            self.failures.push(outcome);
        }
    }

    /// Failures recorded so far
    pub fn failures(&self) -> &[TestOutcome] {
        &self.failures
    }

    /// Report to stdout, colored when stdout is a terminal
    pub fn report_to_stdout(self) -> io::Result<usize> {
        let stdout = io::stdout();
        let color = stdout.is_terminal();
        let mut out = stdout.lock();
        self.with_color(color).report(&mut out)
    }

    /// Write the report and return the number of rerun lines emitted
    ///
    /// Nothing at all is written when no failures were recorded.
    pub fn report<W: Write>(self, out: &mut W) -> io::Result<usize> {
        if self.failures.is_empty() {
            return Ok(0);
        }

        if self.color {
            colored::control::set_override(true);
        }
        let result = self.write_report(out);
        if self.color {
            colored::control::unset_override();
        }
        result
    }

    fn write_report<W: Write>(&self, out: &mut W) -> io::Result<usize> {
        writeln!(out)?;
        writeln!(out, "{}", HEADER)?;

        let mut emitted = 0;
        for failure in &self.failures {
            let Some(line) = self.rerun_line(failure) else {
                tracing::debug!(origin = ?failure.origin, "failure has no source location");
                continue;
            };

            if self.color {
                writeln!(out, "{}", line.red())?;
            } else {
                writeln!(out, "{}", line)?;
            }
            emitted += 1;
        }

        Ok(emitted)
    }

    /// Build the rerun command for a failure, if its location is known
    fn rerun_line(&self, failure: &TestOutcome) -> Option<String> {
        let location = failure.origin.location(self.registry)?;
        let file = relative_to(&location.file, &self.cwd);
        Some(format!("{} {} -l {}", self.prefix, file.display(), location.line))
    }
}

/// Rewrite an absolute path under `cwd` relative to it
///
/// Relative paths, paths outside `cwd` and `cwd` itself are returned
/// unchanged.
fn relative_to<'a>(file: &'a Path, cwd: &Path) -> &'a Path {
    if !file.is_absolute() {
        return file;
    }
    match file.strip_prefix(cwd) {
        Ok(relative) if !relative.as_os_str().is_empty() => relative,
        _ => file,
    }
}
