//! Scan command - list tests and groups defined in a file

use super::load_registry;
use anyhow::Result;
use std::path::PathBuf;
use testline_core::{scan, Candidate};

/// Arguments for the scan command
pub struct ScanArgs {
    /// Registry manifest path
    pub registry: PathBuf,
    /// File to scan
    pub file: PathBuf,
    /// Output as JSON
    pub json: bool,
    /// Working directory relative paths are resolved against
    pub project_dir: PathBuf,
}

/// Run the scan command
pub fn run(args: ScanArgs) -> Result<()> {
    let candidates = candidates(&args)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&candidates)?);
    } else {
        print!("{}", render(&candidates));
    }

    Ok(())
}

/// Candidates for the file, ordered by start line then filter
pub fn candidates(args: &ScanArgs) -> Result<Vec<Candidate>> {
    let registry = load_registry(&args.registry, &args.project_dir)?;
    let mut candidates = scan(&registry, &args.file, &args.project_dir);
    candidates.sort_by(|a, b| a.line.cmp(&b.line).then_with(|| a.filter.cmp(&b.filter)));
    Ok(candidates)
}

/// One `LINE<TAB>FILTER` row per candidate
fn render(candidates: &[Candidate]) -> String {
    candidates
        .iter()
        .map(|c| format!("{}\t{}\n", c.line, c.filter))
        .collect()
}
