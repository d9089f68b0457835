//! Registry scanning - find every test defined in a file

use crate::registry::{absolutize, Registry, Runnable};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

/// A unit the resolver can choose
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Candidate {
    /// Exact case identifier (`Runnable#case`) or group pattern (`/Group/`)
    pub filter: String,
    /// Line where the definition begins
    pub line: u32,
}

impl Candidate {
    pub fn new(filter: impl Into<String>, line: u32) -> Self {
        Self {
            filter: filter.into(),
            line,
        }
    }
}

/// Enumerate every test and group defined in `target_file`
///
/// Cases come first, then groups. Identical `(filter, line)` pairs are
/// collapsed, keeping the first occurrence.
///
/// The target and every recorded location are resolved against `base_dir`
/// and normalized before comparison, so `calc_test`, `./calc_test` and
/// `/proj/sub/../calc_test` all name the same file.
pub fn scan(registry: &Registry, target_file: &Path, base_dir: &Path) -> Vec<Candidate> {
    let target = absolutize(target_file, base_dir);
    let mut seen = HashSet::new();
    let candidates: Vec<Candidate> = case_candidates(registry, &target, base_dir)
        .chain(group_candidates(registry, &target, base_dir))
        .filter(|candidate| seen.insert(candidate.clone()))
        .collect();

    tracing::debug!(
        file = %target.display(),
        count = candidates.len(),
        "scanned registry"
    );

    candidates
}

fn case_candidates<'a>(
    registry: &'a Registry,
    target_file: &'a Path,
    base_dir: &'a Path,
) -> impl Iterator<Item = Candidate> + 'a {
    registry.runnables().iter().flat_map(move |runnable| {
        let name = runnable.name.as_deref();
        runnable.cases.iter().filter_map(move |case| {
            let Some(location) = registry.location_of(name, case) else {
                tracing::trace!(runnable = ?name, case = %case, "case has no source location");
                return None;
            };
            if absolutize(&location.file, base_dir) != target_file {
                return None;
            }
            let filter = match name {
                Some(name) => format!("{}#{}", name, case),
                None => case.clone(),
            };
            Some(Candidate::new(filter, location.line))
        })
    })
}

fn group_candidates<'a>(
    registry: &'a Registry,
    target_file: &'a Path,
    base_dir: &'a Path,
) -> impl Iterator<Item = Candidate> + 'a {
    registry
        .runnables()
        .iter()
        .filter_map(move |runnable| group_candidate(runnable, target_file, base_dir))
}

fn group_candidate(runnable: &Runnable, target_file: &Path, base_dir: &Path) -> Option<Candidate> {
    let stack = runnable.declared_at.as_ref()?;
    let name = runnable.name.as_deref()?;
    let frame = stack
        .iter()
        .find(|frame| absolutize(&frame.file, base_dir) == target_file)?;
    Some(Candidate::new(group_pattern(name), frame.line))
}

/// Pattern matching a group and everything nested under it
pub fn group_pattern(name: &str) -> String {
    format!("/{}/", regex::escape(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Runnable, SourceLocation};
    use pretty_assertions::assert_eq;

    const CALC: &str = "/home/u/proj/calc_test.rb";

    fn calc_registry() -> Registry {
        let mut registry = Registry::new();
        registry.define_case(Some("CalcTest"), "test_adds", Some(SourceLocation::new(CALC, 5)));
        registry.define_case(Some("CalcTest"), "test_subtracts", Some(SourceLocation::new(CALC, 12)));
        registry
    }

    #[test]
    fn test_scan_cases_in_target_file() {
        let candidates = scan(&calc_registry(), Path::new(CALC), Path::new("/"));
        assert_eq!(
            candidates,
            vec![
                Candidate::new("CalcTest#test_adds", 5),
                Candidate::new("CalcTest#test_subtracts", 12),
            ]
        );
    }

    #[test]
    fn test_scan_ignores_other_files() {
        let mut registry = calc_registry();
        registry.define_case(
            Some("OtherTest"),
            "test_other",
            Some(SourceLocation::new("/home/u/proj/other_test.rb", 5)),
        );

        let candidates = scan(&registry, Path::new(CALC), Path::new("/"));
        assert!(candidates.iter().all(|c| c.filter.starts_with("CalcTest#")));
    }

    #[test]
    fn test_scan_anonymous_runnable_uses_bare_case_name() {
        let mut registry = Registry::new();
        registry.define_case(None, "test_top_level", Some(SourceLocation::new(CALC, 2)));

        assert_eq!(
            scan(&registry, Path::new(CALC), Path::new("/")),
            vec![Candidate::new("test_top_level", 2)]
        );
    }

    #[test]
    fn test_scan_drops_cases_without_location() {
        let mut registry = calc_registry();
        registry.define_case(Some("CalcTest"), "test_generated", None);

        assert_eq!(scan(&registry, Path::new(CALC), Path::new("/")).len(), 2);
    }

    #[test]
    fn test_scan_group_uses_first_matching_frame() {
        let mut registry = Registry::new();
        registry.add_runnable(
            Runnable::group(
                "Calculator",
                vec![
                    SourceLocation::new("/home/u/proj/support/dsl.rb", 40),
                    SourceLocation::new(CALC, 3),
                    SourceLocation::new(CALC, 1),
                ],
            )
            .with_case("test_0001_adds two numbers"),
        );

        let candidates = scan(&registry, Path::new(CALC), Path::new("/"));
        assert_eq!(candidates, vec![Candidate::new("/Calculator/", 3)]);
    }

    #[test]
    fn test_scan_group_without_matching_frame_is_dropped() {
        let mut registry = Registry::new();
        registry.add_runnable(Runnable::group(
            "Elsewhere",
            vec![SourceLocation::new("/home/u/proj/other_test.rb", 3)],
        ));

        assert!(scan(&registry, Path::new(CALC), Path::new("/")).is_empty());
    }

    #[test]
    fn test_scan_group_and_nested_cases() {
        let mut registry = Registry::new();
        registry.declare_group("Calculator", vec![SourceLocation::new(CALC, 3)]);
        registry.define_case(
            Some("Calculator"),
            "test_0001_adds two numbers",
            Some(SourceLocation::new(CALC, 4)),
        );

        let candidates = scan(&registry, Path::new(CALC), Path::new("/"));
        assert_eq!(
            candidates,
            vec![
                Candidate::new("Calculator#test_0001_adds two numbers", 4),
                Candidate::new("/Calculator/", 3),
            ]
        );
    }

    #[test]
    fn test_scan_deduplicates_identical_pairs() {
        let mut registry = Registry::new();
        registry.declare_group("Calculator", vec![SourceLocation::new(CALC, 3)]);
        // A reopened group registers the same name and site a second time
        registry.add_runnable(Runnable::group("Calculator", vec![SourceLocation::new(CALC, 3)]));

        assert_eq!(
            scan(&registry, Path::new(CALC), Path::new("/")),
            vec![Candidate::new("/Calculator/", 3)]
        );
    }

    #[test]
    fn test_scan_keeps_same_filter_on_distinct_lines() {
        let mut registry = Registry::new();
        registry.declare_group("Calculator", vec![SourceLocation::new(CALC, 3)]);
        registry.add_runnable(Runnable::group("Calculator", vec![SourceLocation::new(CALC, 30)]));

        assert_eq!(scan(&registry, Path::new(CALC), Path::new("/")).len(), 2);
    }

    #[test]
    fn test_scan_matches_relative_locations_against_base() {
        let mut registry = Registry::new();
        registry.define_case(Some("CalcTest"), "test_adds", Some(SourceLocation::new("calc_test.rb", 5)));
        registry.declare_group("Calculator", vec![SourceLocation::new("./calc_test.rb", 3)]);

        assert_eq!(
            scan(&registry, Path::new(CALC), Path::new("/home/u/proj")),
            vec![
                Candidate::new("CalcTest#test_adds", 5),
                Candidate::new("/Calculator/", 3),
            ]
        );
    }

    #[test]
    fn test_scan_normalizes_parent_components_in_target() {
        let candidates = scan(
            &calc_registry(),
            Path::new("../proj/calc_test.rb"),
            Path::new("/home/u/proj"),
        );
        assert_eq!(candidates.len(), 2);

        let candidates = scan(
            &calc_registry(),
            Path::new("/home/u/other/../proj/./calc_test.rb"),
            Path::new("/"),
        );
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn test_group_pattern_escapes_metacharacters() {
        assert_eq!(group_pattern("Calculator"), "/Calculator/");
        assert_eq!(group_pattern("Calc.add(x)"), r"/Calc\.add\(x\)/");
    }
}
