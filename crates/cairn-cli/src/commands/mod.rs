//! CLI command implementations

pub mod build;
pub mod configure;
pub mod fetch;
pub mod params;

use anyhow::{Context, Result};
use cairn_asset::ProjectConfig;
use std::path::Path;

pub(crate) fn load_config(path: &Path) -> Result<ProjectConfig> {
    ProjectConfig::load(path)
        .with_context(|| format!("Failed to load project config {}", path.display()))
}
