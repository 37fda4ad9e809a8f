//! Project configuration (`cairn.toml`)
//!
//! Relative paths in the file resolve against the directory containing it.

use crate::database::FsAssetDatabase;
use crate::exclusion::ExclusionFilter;
use crate::registry::ConfiguratorRegistry;
use crate::resolver::AutoSettings;
use crate::rules::{RuleConfig, RuleConfigurator};
use crate::settings::DistributionSettings;
use cairn_core::{CairnError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The `[project]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSection {
    /// Asset database root
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Distribution settings document
    #[serde(default = "default_settings")]
    pub settings: PathBuf,
    /// Persisted build parameters
    #[serde(default = "default_build_parameters")]
    pub build_parameters: PathBuf,
    /// Build pipeline output root
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Excluded path roots
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Default for ProjectSection {
    fn default() -> Self {
        Self {
            root: default_root(),
            settings: default_settings(),
            build_parameters: default_build_parameters(),
            output: default_output(),
            exclude: Vec::new(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}
fn default_settings() -> PathBuf {
    PathBuf::from(".cairn/settings.toml")
}
fn default_build_parameters() -> PathBuf {
    PathBuf::from(".cairn/build_parameters.json")
}
fn default_output() -> PathBuf {
    PathBuf::from("build")
}

/// Top-level config file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub project: ProjectSection,
    #[serde(default, rename = "rule")]
    pub rules: Vec<RuleConfig>,
    #[serde(skip)]
    base_dir: PathBuf,
}

impl ProjectConfig {
    /// Load the config file; relative paths resolve against its directory
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CairnError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let mut config = Self::from_toml(&content)?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| CairnError::ConfigError(format!("Failed to parse cairn.toml: {}", e)))
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn root_dir(&self) -> PathBuf {
        self.resolve(&self.project.root)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.resolve(&self.project.settings)
    }

    pub fn build_parameters_path(&self) -> PathBuf {
        self.resolve(&self.project.build_parameters)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.resolve(&self.project.output)
    }

    pub fn exclusion_filter(&self) -> ExclusionFilter {
        ExclusionFilter::new(&self.project.exclude)
    }

    /// Build a registry with one rule configurator per `[[rule]]`, in file order
    pub fn registry(&self) -> Result<ConfiguratorRegistry> {
        let mut registry = ConfiguratorRegistry::new();
        for rule in &self.rules {
            let configurator = RuleConfigurator::new(rule)?;
            registry.register(rule.path.clone(), move || configurator.clone())?;
        }
        Ok(registry)
    }

    /// Assemble the auto-settings context over the project on disk
    pub fn open_auto_settings(&self) -> Result<AutoSettings> {
        Ok(AutoSettings::new(
            self.exclusion_filter(),
            self.registry()?,
            Box::new(FsAssetDatabase::new(self.root_dir())),
            DistributionSettings::open(self.settings_path())?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[project]
root = "game"
exclude = ["Assets/Scripts", "Assets/AddressableAssetsData"]

[[rule]]
path = "Assets/Art/Weapons"
group = "Weapons"
create_group = true
labels = ["common", "weapon"]
address_prefix = "wp_"

[[rule]]
path = "Assets/Audio"
group_keyword = "Audio"
"#;

    #[test]
    fn test_parse_config() {
        let config = ProjectConfig::from_toml(SAMPLE).unwrap();
        assert_eq!(config.project.root, PathBuf::from("game"));
        assert_eq!(config.project.settings, PathBuf::from(".cairn/settings.toml"));
        assert_eq!(config.rules.len(), 2);
        assert!(config.exclusion_filter().is_excluded("Assets/Scripts/a.cs"));
    }

    #[test]
    fn test_registry_from_rules() {
        let config = ProjectConfig::from_toml(SAMPLE).unwrap();
        let registry = config.registry().unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.resolve("Assets/Art/Weapons/sword.png").is_some());
        assert!(registry.resolve("Assets/Scenes/main.scene").is_none());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ProjectConfig::from_toml("").unwrap();
        assert_eq!(config.project, ProjectSection::default());
        assert!(config.rules.is_empty());
    }

    #[test]
    fn test_paths_resolve_against_config_dir() {
        let dir = std::env::temp_dir().join(format!("cairn_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("cairn.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = ProjectConfig::load(&path).unwrap();
        assert_eq!(config.root_dir(), dir.join("game"));
        assert_eq!(config.settings_path(), dir.join(".cairn/settings.toml"));
        assert_eq!(config.output_dir(), dir.join("build"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_rule_is_config_error() {
        let config = ProjectConfig::from_toml(
            r#"
[[rule]]
path = "Assets/Art"
"#,
        )
        .unwrap();
        assert!(matches!(config.registry(), Err(CairnError::ConfigError(_))));
    }
}
