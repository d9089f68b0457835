//! Line resolution - pick the test that owns a line

use crate::scanner::Candidate;
use crate::ResolveError;

/// Resolve `target_line` to the filter of the candidate that owns it
///
/// A candidate owns every line from its start up to the next later start,
/// so the highest start at or before the target wins. Candidates sharing a
/// start line keep their input order.
pub fn resolve(candidates: &[Candidate], target_line: u32) -> Result<String, ResolveError> {
    let mut ordered: Vec<&Candidate> = candidates.iter().collect();
    ordered.sort_by(|a, b| b.line.cmp(&a.line));

    let owner = ordered
        .into_iter()
        .find(|candidate| candidate.line <= target_line)
        .ok_or(ResolveError::NoMatch { line: target_line })?;

    tracing::debug!(line = target_line, filter = %owner.filter, start = owner.line, "resolved line");
    Ok(owner.filter.clone())
}
