//! Persisted build parameters
//!
//! A small JSON document read on first access. Setters rewrite the whole
//! document, and only when the value actually changes.

use cairn_core::{CairnError, Result};
use once_cell::unsync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Placeholder in `base_remote_path` replaced by the target environment
const TARGET_ENV_TOKEN: &str = "{0}";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildParameters {
    #[serde(default)]
    pub base_remote_path: String,
    #[serde(default)]
    pub remote_target_env: String,
    #[serde(default)]
    pub version_code: String,
}

impl BuildParameters {
    /// Whether the base path has a slot for the target environment
    pub fn has_target_env_slot(&self) -> bool {
        self.base_remote_path.contains(TARGET_ENV_TOKEN)
    }

    /// The remote path with the target environment substituted in
    pub fn remote_path(&self) -> String {
        if self.has_target_env_slot() {
            self.base_remote_path
                .replace(TARGET_ENV_TOKEN, &self.remote_target_env)
        } else {
            self.base_remote_path.clone()
        }
    }
}

/// Lazily loaded, write-through [`BuildParameters`]
#[derive(Debug)]
pub struct BuildParameterStore {
    path: PathBuf,
    cached: OnceCell<BuildParameters>,
}

impl BuildParameterStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            cached: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current parameters, reading the file on first access
    pub fn get(&self) -> Result<&BuildParameters> {
        self.cached.get_or_try_init(|| read(&self.path))
    }

    pub fn remote_path(&self) -> Result<String> {
        Ok(self.get()?.remote_path())
    }

    pub fn set_base_remote_path(&mut self, value: &str) -> Result<bool> {
        self.update(|p| &mut p.base_remote_path, value)
    }

    pub fn set_remote_target_env(&mut self, value: &str) -> Result<bool> {
        self.update(|p| &mut p.remote_target_env, value)
    }

    pub fn set_version_code(&mut self, value: &str) -> Result<bool> {
        self.update(|p| &mut p.version_code, value)
    }

    /// Set one field; returns whether the document was rewritten
    fn update(
        &mut self,
        field: fn(&mut BuildParameters) -> &mut String,
        value: &str,
    ) -> Result<bool> {
        self.get()?;
        let params = self.cached.get_mut().ok_or_else(|| {
            CairnError::ConfigError("build parameters failed to load".to_string())
        })?;

        let slot = field(params);
        if slot.as_str() == value {
            return Ok(false);
        }
        *slot = value.to_string();

        write(&self.path, params)?;
        Ok(true)
    }
}

fn read(path: &Path) -> Result<BuildParameters> {
    if !path.exists() {
        debug!(path = %path.display(), "no build parameters yet, using defaults");
        return Ok(BuildParameters::default());
    }
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

fn write(path: &Path, params: &BuildParameters) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(params)?)?;
    debug!(path = %path.display(), "build parameters saved");
    Ok(())
}
