//! Distribution settings: groups, entries, templates and build profile
//!
//! The settings document is TOML. When opened from a file, every mutating
//! engine call writes the whole document back so the file is always current.

use cairn_core::{ContentHash, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Build and load locations of a group's bundles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleSchema {
    pub build_path: String,
    pub load_path: String,
    #[serde(default = "default_true")]
    pub include_in_build: bool,
}

fn default_true() -> bool {
    true
}

/// One addressable asset inside a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetEntry {
    pub guid: ContentHash,
    pub asset_path: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_prefix: Option<String>,
    #[serde(default)]
    pub labels: BTreeSet<String>,
}

impl AssetEntry {
    /// A fresh entry is addressed by its full path until renamed
    pub fn new(guid: ContentHash, asset_path: &str) -> Self {
        Self {
            guid,
            asset_path: asset_path.to_string(),
            address: asset_path.to_string(),
            address_prefix: None,
            labels: BTreeSet::new(),
        }
    }
}

/// A named distribution unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionGroup {
    /// A blank name marks a corrupt group record
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<BundleSchema>,
    #[serde(default, rename = "entry")]
    pub entries: Vec<AssetEntry>,
}

impl DistributionGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            entries: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty()
    }

    pub fn entry(&self, guid: &ContentHash) -> Option<&AssetEntry> {
        self.entries.iter().find(|e| e.guid == *guid)
    }

    pub fn entry_mut(&mut self, guid: &ContentHash) -> Option<&mut AssetEntry> {
        self.entries.iter_mut().find(|e| e.guid == *guid)
    }
}

/// Blueprint for groups created on demand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupTemplate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<BundleSchema>,
}

impl GroupTemplate {
    /// Stamp out a new group with this template's schema
    pub fn instantiate(&self, group_name: &str) -> DistributionGroup {
        DistributionGroup {
            name: group_name.to_string(),
            schema: self.schema.clone(),
            entries: Vec::new(),
        }
    }
}

fn default_templates() -> Vec<GroupTemplate> {
    vec![GroupTemplate {
        name: "Packed Assets".to_string(),
        schema: Some(BundleSchema {
            build_path: "LocalBuildPath".to_string(),
            load_path: "LocalLoadPath".to_string(),
            include_in_build: true,
        }),
    }]
}

/// The distribution settings document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_group: Option<String>,
    #[serde(default)]
    pub build_remote_catalog: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_catalog_build_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_catalog_load_path: Option<String>,
    /// Default-profile variables (name to value)
    #[serde(default)]
    pub profile: BTreeMap<String, String>,
    #[serde(default = "default_templates", rename = "template")]
    pub templates: Vec<GroupTemplate>,
    #[serde(default, rename = "group")]
    pub groups: Vec<DistributionGroup>,
    #[serde(skip)]
    backing: Option<PathBuf>,
}

impl Default for DistributionSettings {
    fn default() -> Self {
        Self {
            default_group: None,
            build_remote_catalog: false,
            remote_catalog_build_path: None,
            remote_catalog_load_path: None,
            profile: BTreeMap::new(),
            templates: default_templates(),
            groups: Vec::new(),
            backing: None,
        }
    }
}

impl DistributionSettings {
    /// Create in-memory settings that are never written to disk
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the settings file, starting from defaults if it does not exist yet
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut settings = if path.exists() {
            Self::from_toml(&fs::read_to_string(path)?)?
        } else {
            debug!(path = %path.display(), "settings file missing, using defaults");
            Self::default()
        };
        settings.backing = Some(path.to_path_buf());
        Ok(settings)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The file these settings persist to, if any
    pub fn backing_path(&self) -> Option<&Path> {
        self.backing.as_deref()
    }

    /// Write the whole document to its backing file (no-op when in memory)
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.backing else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Valid group with exactly this name
    pub fn group(&self, name: &str) -> Option<&DistributionGroup> {
        self.groups.iter().find(|g| g.is_valid() && g.name == name)
    }

    pub fn group_mut(&mut self, name: &str) -> Option<&mut DistributionGroup> {
        self.groups.iter_mut().find(|g| g.is_valid() && g.name == name)
    }

    /// The group currently holding an asset, with its entry
    pub fn find_entry(&self, guid: &ContentHash) -> Option<(&DistributionGroup, &AssetEntry)> {
        self.groups
            .iter()
            .filter(|g| g.is_valid())
            .find_map(|g| g.entry(guid).map(|e| (g, e)))
    }

    /// Place an asset's entry into `group_name`, moving it out of any other group
    ///
    /// A moved entry keeps its address and labels. Returns `false` when the
    /// target group does not exist.
    pub fn create_or_move_entry(
        &mut self,
        guid: ContentHash,
        asset_path: &str,
        group_name: &str,
    ) -> bool {
        if self.group(group_name).is_none() {
            return false;
        }

        let mut entry = None;
        for group in self.groups.iter_mut().filter(|g| g.is_valid()) {
            if let Some(index) = group.entries.iter().position(|e| e.guid == guid) {
                if group.name == group_name {
                    group.entries[index].asset_path = asset_path.to_string();
                    return true;
                }
                entry = Some(group.entries.remove(index));
                break;
            }
        }

        let mut entry = entry.unwrap_or_else(|| AssetEntry::new(guid, asset_path));
        entry.asset_path = asset_path.to_string();
        if let Some(group) = self.group_mut(group_name) {
            group.entries.push(entry);
        }
        true
    }

    /// Total entries across valid groups
    pub fn entry_count(&self) -> usize {
        self.groups
            .iter()
            .filter(|g| g.is_valid())
            .map(|g| g.entries.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guid(path: &str) -> ContentHash {
        ContentHash::for_asset_path(path)
    }

    fn settings_with_groups(names: &[&str]) -> DistributionSettings {
        let mut settings = DistributionSettings::new();
        for name in names {
            settings.groups.push(DistributionGroup::new(*name));
        }
        settings
    }

    #[test]
    fn test_create_entry() {
        let mut settings = settings_with_groups(&["Weapons"]);
        assert!(settings.create_or_move_entry(guid("Assets/a.png"), "Assets/a.png", "Weapons"));

        let (group, entry) = settings.find_entry(&guid("Assets/a.png")).unwrap();
        assert_eq!(group.name, "Weapons");
        assert_eq!(entry.address, "Assets/a.png");
    }

    #[test]
    fn test_move_entry_keeps_labels() {
        let mut settings = settings_with_groups(&["A", "B"]);
        let id = guid("Assets/a.png");
        settings.create_or_move_entry(id, "Assets/a.png", "A");
        settings.group_mut("A").unwrap().entry_mut(&id).unwrap().labels.insert("keep".into());

        assert!(settings.create_or_move_entry(id, "Assets/a.png", "B"));
        assert!(settings.group("A").unwrap().entries.is_empty());
        let (group, entry) = settings.find_entry(&id).unwrap();
        assert_eq!(group.name, "B");
        assert!(entry.labels.contains("keep"));
        assert_eq!(settings.entry_count(), 1);
    }

    #[test]
    fn test_move_into_missing_group() {
        let mut settings = settings_with_groups(&["A"]);
        assert!(!settings.create_or_move_entry(guid("Assets/a.png"), "Assets/a.png", "Nope"));
        assert_eq!(settings.entry_count(), 0);
    }

    #[test]
    fn test_invalid_groups_are_invisible() {
        let settings = settings_with_groups(&["", "Weapons"]);
        assert!(settings.group("").is_none());
        assert!(settings.group("Weapons").is_some());
    }

    #[test]
    fn test_toml_roundtrip_preserves_entries() {
        let mut settings = settings_with_groups(&["Weapons"]);
        settings.profile.insert("ClientMasterLoadPath".into(), "Remote".into());
        let id = guid("Assets/Art/sword.png");
        settings.create_or_move_entry(id, "Assets/Art/sword.png", "Weapons");
        settings.group_mut("Weapons").unwrap().entry_mut(&id).unwrap().labels.insert("weapon".into());

        let text = settings.to_toml().unwrap();
        let parsed = DistributionSettings::from_toml(&text).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn test_missing_templates_fall_back_to_default() {
        let parsed = DistributionSettings::from_toml("build_remote_catalog = true").unwrap();
        assert!(parsed.build_remote_catalog);
        assert_eq!(parsed.templates.len(), 1);
        assert_eq!(parsed.templates[0].name, "Packed Assets");
    }

    #[test]
    fn test_blank_group_record_parses() {
        let parsed = DistributionSettings::from_toml(
            r#"
[[group]]

[[group]]
name = "Weapons"
"#,
        )
        .unwrap();
        assert_eq!(parsed.groups.len(), 2);
        assert!(!parsed.groups[0].is_valid());
    }

    #[test]
    fn test_open_and_save() {
        let dir = std::env::temp_dir().join(format!("cairn_test_{}", uuid::Uuid::new_v4()));
        let path = dir.join("settings.toml");

        let mut settings = DistributionSettings::open(&path).unwrap();
        assert!(settings.groups.is_empty());
        settings.groups.push(DistributionGroup::new("Weapons"));
        settings.save().unwrap();

        let reopened = DistributionSettings::open(&path).unwrap();
        assert!(reopened.group("Weapons").is_some());
        assert_eq!(reopened.backing_path(), Some(path.as_path()));

        fs::remove_dir_all(&dir).ok();
    }
}
