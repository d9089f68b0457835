//! Report command - print rerun commands for failed tests

use super::{load_config, load_registry};
use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use testline_core::{parse_outcomes, FailureReporter, TestOutcome};

/// Arguments for the report command
pub struct ReportArgs {
    /// Registry manifest path
    pub registry: PathBuf,
    /// Results file, `-` for stdin
    pub results: PathBuf,
    /// Prefix override from the command line
    pub prefix: Option<String>,
    /// Working directory rerun paths are made relative to
    pub project_dir: PathBuf,
}

/// Run the report command
pub fn run(args: ReportArgs) -> Result<()> {
    let config = load_config(&args.project_dir)?;
    let prefix = args
        .prefix
        .clone()
        .unwrap_or_else(|| config.rerun_prefix().to_string());

    let registry = load_registry(&args.registry, &args.project_dir)?;
    let outcomes = read_outcomes(&args.results)?;

    let mut reporter = FailureReporter::new(&registry, prefix, &args.project_dir);
    for outcome in outcomes {
        reporter.record(outcome);
    }
    tracing::debug!(failures = reporter.failures().len(), "collected results");

    reporter
        .report_to_stdout()
        .context("failed to write report")?;
    Ok(())
}

fn read_outcomes(path: &Path) -> Result<Vec<TestOutcome>> {
    let content = if path == Path::new("-") {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .context("failed to read results from stdin")?;
        content
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("failed to read results {}", path.display()))?
    };

    parse_outcomes(&content).with_context(|| format!("invalid results in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use testline_core::Status;

    #[test]
    fn test_read_outcomes_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.jsonl");
        fs::write(
            &path,
            "{\"status\":\"failed\",\"kind\":\"named\",\"runnable\":\"CalcTest\",\"case\":\"test_adds\"}\n",
        )
        .unwrap();

        let outcomes = read_outcomes(&path).unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].status, Status::Failed);
    }

    #[test]
    fn test_read_outcomes_missing_file() {
        let dir = tempdir().unwrap();
        let err = read_outcomes(&dir.path().join("nope.jsonl")).unwrap_err();
        assert!(err.to_string().contains("failed to read results"));
    }
}
