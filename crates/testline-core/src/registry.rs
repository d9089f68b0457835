//! Test registry - runnables, cases and their source locations
//!
//! The host engine builds a [`Registry`] once at test-definition time and
//! passes it by reference to the scanner and the reporter. Case locations
//! live in a metadata table keyed by `(runnable, case)`, filled in by
//! whatever mechanism defines the tests.

use crate::ManifestError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// A `(file, line)` pair where a definition begins
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: PathBuf,
    pub line: u32,
}

/// One frame of a group's declaration stack
pub type StackFrame = SourceLocation;

impl SourceLocation {
    pub fn new(file: impl Into<PathBuf>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Location of the code that called the enclosing `#[track_caller]` chain
    #[track_caller]
    pub fn caller() -> Self {
        let location = std::panic::Location::caller();
        Self::new(location.file(), location.line())
    }
}

/// Key of the location metadata table
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CaseKey {
    /// Owning runnable, `None` for anonymous runnables
    pub runnable: Option<String>,
    /// Case name within the runnable
    pub case: String,
}

impl CaseKey {
    pub fn new(runnable: Option<&str>, case: &str) -> Self {
        Self {
            runnable: runnable.map(str::to_string),
            case: case.to_string(),
        }
    }
}

/// A named group of test cases (a suite, or a dynamically declared group)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Runnable {
    /// Runnable name, `None` for anonymous/top-level runnables
    pub name: Option<String>,
    /// Case names in definition order
    pub cases: Vec<String>,
    /// Declaration stack, innermost frame first. Only groups carry one.
    pub declared_at: Option<Vec<StackFrame>>,
}

impl Runnable {
    /// A suite with the given name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// A top-level runnable without a name
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A dynamically declared group with its declaration stack
    pub fn group(name: impl Into<String>, stack: Vec<StackFrame>) -> Self {
        Self {
            name: Some(name.into()),
            cases: Vec::new(),
            declared_at: Some(stack),
        }
    }

    /// Add a case name (builder style)
    pub fn with_case(mut self, case: impl Into<String>) -> Self {
        self.add_case(case.into());
        self
    }

    /// Check whether this runnable was declared as a group
    pub fn is_group(&self) -> bool {
        self.declared_at.is_some()
    }

    fn add_case(&mut self, case: String) {
        if !self.cases.contains(&case) {
            self.cases.push(case);
        }
    }
}

/// Registry of every known runnable plus the case location table
#[derive(Debug, Clone, Default)]
pub struct Registry {
    runnables: Vec<Runnable>,
    locations: HashMap<CaseKey, SourceLocation>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// All runnables in registration order
    pub fn runnables(&self) -> &[Runnable] {
        &self.runnables
    }

    /// Register a runnable
    pub fn add_runnable(&mut self, runnable: Runnable) {
        self.runnables.push(runnable);
    }

    /// Record where a case definition begins
    pub fn record_location(&mut self, runnable: Option<&str>, case: &str, location: SourceLocation) {
        self.locations.insert(CaseKey::new(runnable, case), location);
    }

    /// Add a case to a runnable, creating the runnable on first use
    pub fn define_case(
        &mut self,
        runnable: Option<&str>,
        case: &str,
        location: Option<SourceLocation>,
    ) {
        self.runnable_mut(runnable).add_case(case.to_string());
        if let Some(location) = location {
            self.record_location(runnable, case, location);
        }
    }

    /// Define a case located at the caller's source position
    #[track_caller]
    pub fn define_case_here(&mut self, runnable: Option<&str>, case: &str) {
        let location = SourceLocation::caller();
        self.define_case(runnable, case, Some(location));
    }

    /// Declare a group with an explicit declaration stack
    ///
    /// If a runnable with this name already exists it becomes a group.
    pub fn declare_group(&mut self, name: &str, stack: Vec<StackFrame>) {
        self.runnable_mut(Some(name)).declared_at = Some(stack);
    }

    /// Declare a group whose declaration site is the caller's position
    #[track_caller]
    pub fn declare_group_here(&mut self, name: &str) {
        let frame = SourceLocation::caller();
        self.declare_group(name, vec![frame]);
    }

    /// Look up a case's location
    pub fn location_of(&self, runnable: Option<&str>, case: &str) -> Option<&SourceLocation> {
        self.locations.get(&CaseKey::new(runnable, case))
    }

    /// Build a registry from a host-provided manifest
    ///
    /// Relative files in the manifest are resolved against `base_dir`.
    pub fn from_manifest(manifest: RegistryManifest, base_dir: &Path) -> Self {
        let mut registry = Registry::new();

        for entry in manifest.runnables {
            let mut runnable = Runnable {
                name: entry.name,
                cases: Vec::new(),
                declared_at: entry.declared_at.map(|stack| {
                    stack
                        .into_iter()
                        .map(|frame| SourceLocation::new(absolutize(&frame.file, base_dir), frame.line))
                        .collect()
                }),
            };

            for case in entry.cases {
                if let Some(location) = case.location {
                    let location = SourceLocation::new(absolutize(&location.file, base_dir), location.line);
                    registry.record_location(runnable.name.as_deref(), &case.name, location);
                }
                runnable.add_case(case.name);
            }

            registry.add_runnable(runnable);
        }

        registry
    }

    fn runnable_mut(&mut self, name: Option<&str>) -> &mut Runnable {
        let index = match self.runnables.iter().position(|r| r.name.as_deref() == name) {
            Some(index) => index,
            None => {
                self.runnables.push(Runnable {
                    name: name.map(str::to_string),
                    ..Runnable::default()
                });
                self.runnables.len() - 1
            }
        };
        &mut self.runnables[index]
    }
}

/// Serialized form of a registry, as dumped by a host engine
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RegistryManifest {
    #[serde(default)]
    pub runnables: Vec<RunnableEntry>,
}

/// A runnable in a [`RegistryManifest`]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RunnableEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cases: Vec<CaseEntry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_at: Option<Vec<StackFrame>>,
}

/// A case in a [`RegistryManifest`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CaseEntry {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

impl RegistryManifest {
    /// Parse a manifest from JSON text
    pub fn from_json(content: &str) -> Result<Self, ManifestError> {
        serde_json::from_str(content).map_err(ManifestError::InvalidManifest)
    }

    /// Load a manifest from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, ManifestError> {
        let content = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }
}

/// Resolve `path` against `base` unless it is already absolute
///
/// The result is normalized lexically: `.` components are dropped and `..`
/// removes the preceding component. Symlinks are not followed.
pub(crate) fn absolutize(path: &Path, base: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };
    normalize(&joined)
}

fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let ends_in_name = matches!(normalized.components().next_back(), Some(Component::Normal(_)));
                if ends_in_name {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}
