pub mod report;
pub mod resolve;
pub mod scan;

use anyhow::{Context, Result};
use std::path::Path;
use testline_config::{Config, ConfigLoader};
use testline_core::{Registry, RegistryManifest};

/// Load the registry manifest, resolving relative locations against `project_dir`
pub(crate) fn load_registry(path: &Path, project_dir: &Path) -> Result<Registry> {
    let manifest = RegistryManifest::load_from_file(path)
        .with_context(|| format!("failed to load registry manifest {}", path.display()))?;
    Ok(Registry::from_manifest(manifest, project_dir))
}

/// Load testline.toml (if any) plus environment overrides
pub(crate) fn load_config(project_dir: &Path) -> Result<Config> {
    ConfigLoader::new()
        .load_from_directory(project_dir)
        .context("failed to load testline configuration")
}
