//! Execution filters
//!
//! The resolver hands back either an exact case identifier or a `/pattern/`
//! selecting a group. Hosts that do not already understand this syntax can
//! use [`Filter`] to decide which cases to run.

use crate::FilterError;
use regex::Regex;

/// A parsed filter expression
#[derive(Debug, Clone)]
pub enum Filter {
    /// Matches a case name or a full `Runnable#case` identifier exactly
    Exact(String),
    /// Matches any case whose name or identifier contains the pattern
    Pattern(Regex),
}

impl Filter {
    /// Parse a filter expression; `/.../` is a pattern, anything else is exact
    pub fn parse(expr: &str) -> Result<Self, FilterError> {
        match expr
            .strip_prefix('/')
            .and_then(|rest| rest.strip_suffix('/'))
        {
            Some(pattern) => Regex::new(pattern)
                .map(Filter::Pattern)
                .map_err(|source| FilterError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                }),
            None => Ok(Filter::Exact(expr.to_string())),
        }
    }

    /// Check whether the case `case` of runnable `runnable` is selected
    pub fn matches(&self, runnable: Option<&str>, case: &str) -> bool {
        let identifier = runnable.map(|name| format!("{}#{}", name, case));
        match self {
            Filter::Exact(expected) => {
                expected == case || identifier.as_deref() == Some(expected.as_str())
            }
            Filter::Pattern(regex) => {
                regex.is_match(case) || identifier.is_some_and(|id| regex.is_match(&id))
            }
        }
    }
}
