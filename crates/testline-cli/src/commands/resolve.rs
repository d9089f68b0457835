//! Resolve command - print the filter for a requested line

use super::{load_config, load_registry};
use anyhow::{Context, Result};
use std::path::PathBuf;
use testline_core::{LineOptions, LinePlan, TestFileConvention};

/// Arguments for the resolve command
pub struct ResolveArgs {
    /// Registry manifest path
    pub registry: PathBuf,
    /// Requested line
    pub line: Option<u32>,
    /// Harness arguments the test file is detected among
    pub args: Vec<String>,
    /// Working directory relative paths are resolved against
    pub project_dir: PathBuf,
}

/// Run the resolve command
pub fn run(args: ResolveArgs) -> Result<()> {
    if let LinePlan::Filter(filter) = plan(&args)? {
        println!("{}", filter);
    }
    Ok(())
}

/// Work out the line plan without printing anything
pub fn plan(args: &ResolveArgs) -> Result<LinePlan> {
    let config = load_config(&args.project_dir)?;
    let convention = match config.test_file_pattern() {
        Some(pattern) => TestFileConvention::new(pattern).context("invalid test file pattern")?,
        None => TestFileConvention::default(),
    };

    let options = LineOptions::from_args(args.line, &args.args, &convention);
    let registry = load_registry(&args.registry, &args.project_dir)?;

    Ok(options.plan(&registry, &args.project_dir)?)
}
