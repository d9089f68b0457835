//! Completed test results handed over by the host engine

use crate::registry::{Registry, SourceLocation};
use crate::ManifestError;
use serde::{Deserialize, Serialize};

/// Final status of a test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Passed,
    Skipped,
    Failed,
    Errored,
}

impl Status {
    /// Failed and errored results are worth a rerun
    pub fn is_failure(self) -> bool {
        !matches!(self, Status::Passed | Status::Skipped)
    }
}

/// Where a result came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Origin {
    /// The result carries its own location
    Direct { location: Option<SourceLocation> },
    /// The location must be looked up by name in the registry
    Named {
        #[serde(default)]
        runnable: Option<String>,
        case: String,
    },
}

impl Origin {
    /// Resolve this origin to a source location, if one is known
    pub fn location<'a>(&'a self, registry: &'a Registry) -> Option<&'a SourceLocation> {
        match self {
            Origin::Direct { location } => location.as_ref(),
            Origin::Named { runnable, case } => registry.location_of(runnable.as_deref(), case),
        }
    }
}

/// A completed test result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestOutcome {
    pub status: Status,
    #[serde(flatten)]
    pub origin: Origin,
}

impl TestOutcome {
    /// Result for a registered case, located through the registry
    pub fn named(status: Status, runnable: Option<&str>, case: &str) -> Self {
        Self {
            status,
            origin: Origin::Named {
                runnable: runnable.map(str::to_string),
                case: case.to_string(),
            },
        }
    }

    /// Result that knows its own location
    pub fn direct(status: Status, location: Option<SourceLocation>) -> Self {
        Self {
            status,
            origin: Origin::Direct { location },
        }
    }
}

/// Parse a JSON-lines results stream, one [`TestOutcome`] per line
///
/// Blank lines are ignored.
pub fn parse_outcomes(content: &str) -> Result<Vec<TestOutcome>, ManifestError> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|source| ManifestError::InvalidResult {
                line: index + 1,
                source,
            })
        })
        .collect()
}
