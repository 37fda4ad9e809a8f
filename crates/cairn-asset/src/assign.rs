//! Group, address and label assignment against the distribution settings

use crate::database::AssetDatabase;
use crate::registry::{AssignmentDecision, GroupTarget};
use crate::settings::{DistributionGroup, DistributionSettings};
use cairn_core::{path, CairnError, Result};
use tracing::{debug, info, warn};

/// Applies assignment decisions to distribution settings
///
/// Every mutating call persists the settings before returning.
pub struct AssignmentEngine<'a> {
    settings: &'a mut DistributionSettings,
    database: &'a dyn AssetDatabase,
}

impl<'a> AssignmentEngine<'a> {
    pub fn new(settings: &'a mut DistributionSettings, database: &'a dyn AssetDatabase) -> Self {
        Self { settings, database }
    }

    /// Resolve the decision's group target, then assign
    ///
    /// Returns the group name and the address the entry ended up with.
    pub fn apply(
        &mut self,
        asset_path: &str,
        decision: &AssignmentDecision,
    ) -> Result<(String, String)> {
        let group = match &decision.group {
            GroupTarget::Named { name, force_create } => {
                self.get_group(name, *force_create)?.name.clone()
            }
            GroupTarget::Keyword(keyword) => self.search_group(keyword)?.name.clone(),
        };
        let address = self.assign(
            asset_path,
            &group,
            &decision.labels,
            decision.address_prefix.as_deref(),
        )?;
        Ok((group, address))
    }

    /// Place the asset in `group`, address it by file name and add `labels`
    pub fn assign(
        &mut self,
        asset_path: &str,
        group: &str,
        labels: &[String],
        address_prefix: Option<&str>,
    ) -> Result<String> {
        // an unaddressable path must not leave an entry behind
        path::address_for(&path::normalize(asset_path), address_prefix)?;

        self.set_group(asset_path, group)?;
        let address = self.rename(asset_path, group, address_prefix)?;
        self.set_labels(asset_path, group, labels)?;
        Ok(address)
    }

    /// Create or move the asset's entry into `group`
    pub fn set_group(&mut self, asset_path: &str, group: &str) -> Result<()> {
        let asset_path = path::normalize(asset_path);
        let guid = self.database.guid(&asset_path);
        if !self.settings.create_or_move_entry(guid, &asset_path, group) {
            return Err(CairnError::GroupNotFound(group.to_string()));
        }
        self.settings.save()
    }

    /// Address the entry by its file name, optionally prefixed
    pub fn rename(
        &mut self,
        asset_path: &str,
        group: &str,
        address_prefix: Option<&str>,
    ) -> Result<String> {
        let asset_path = path::normalize(asset_path);
        let address = path::address_for(&asset_path, address_prefix)?;
        let guid = self.database.guid(&asset_path);

        let entry = self
            .settings
            .group_mut(group)
            .ok_or_else(|| CairnError::GroupNotFound(group.to_string()))?
            .entry_mut(&guid)
            .ok_or_else(|| CairnError::AssetNotFound(asset_path.clone()))?;
        entry.address = address.clone();
        entry.address_prefix = address_prefix.map(str::to_string);

        self.settings.save()?;
        Ok(address)
    }

    /// Add labels to the entry, keeping any it already has
    pub fn set_labels(&mut self, asset_path: &str, group: &str, labels: &[String]) -> Result<()> {
        if labels.is_empty() {
            return Ok(());
        }

        let asset_path = path::normalize(asset_path);
        let guid = self.database.guid(&asset_path);
        let entry = self
            .settings
            .group_mut(group)
            .ok_or_else(|| CairnError::GroupNotFound(group.to_string()))?
            .entry_mut(&guid)
            .ok_or_else(|| CairnError::AssetNotFound(asset_path.clone()))?;
        entry.labels.extend(labels.iter().cloned());

        self.settings.save()
    }

    /// Look up a group by exact name, creating it from the first template if asked
    pub fn get_group(&mut self, name: &str, force_create: bool) -> Result<&DistributionGroup> {
        if self.settings.group(name).is_none() {
            if !force_create {
                return Err(CairnError::GroupNotFound(name.to_string()));
            }
            self.create_group(name)?;
        }
        self.settings
            .group(name)
            .ok_or_else(|| CairnError::GroupNotFound(name.to_string()))
    }

    /// First group whose name contains `keyword`
    pub fn search_group(&self, keyword: &str) -> Result<&DistributionGroup> {
        self.settings
            .groups
            .iter()
            .find(|g| g.is_valid() && g.name.contains(keyword))
            .ok_or_else(|| CairnError::GroupKeywordNotFound(keyword.to_string()))
    }

    /// Create a group from the first registered template
    pub fn create_group(&mut self, name: &str) -> Result<&DistributionGroup> {
        let template = self
            .settings
            .templates
            .first()
            .ok_or_else(|| CairnError::NoGroupTemplate(name.to_string()))?;
        let group = template.instantiate(name);
        info!(group = name, template = %template.name, "creating group");

        self.settings.groups.push(group);
        self.settings.save()?;
        self.settings
            .group(name)
            .ok_or_else(|| CairnError::GroupNotFound(name.to_string()))
    }

    /// Drop entries whose asset is gone and re-address the rest by file name
    ///
    /// Returns the number of entries removed.
    pub fn prune_stale_entries(&mut self) -> Result<usize> {
        let database = self.database;
        let mut removed = 0;

        for group in self.settings.groups.iter_mut().filter(|g| g.is_valid()) {
            let before = group.entries.len();
            let group_name = group.name.clone();
            group.entries.retain(|entry| {
                let alive = database.load(&entry.asset_path).is_some();
                if !alive {
                    debug!(group = %group_name, asset = %entry.asset_path, "removing stale entry");
                }
                alive
            });
            removed += before - group.entries.len();

            for entry in &mut group.entries {
                match path::address_for(&entry.asset_path, entry.address_prefix.as_deref()) {
                    Ok(address) => entry.address = address,
                    Err(e) => {
                        warn!(
                            group = %group_name,
                            asset = %entry.asset_path,
                            error = %e,
                            "cannot re-address entry"
                        );
                    }
                }
            }
        }

        if removed > 0 {
            info!(removed, "pruned stale entries");
        }
        self.settings.save()?;
        Ok(removed)
    }

    /// Remove corrupt group records, returning how many were dropped
    pub fn remove_invalid_groups(&mut self) -> Result<usize> {
        let before = self.settings.groups.len();
        self.settings.groups.retain(|g| g.is_valid());
        let removed = before - self.settings.groups.len();

        if removed > 0 {
            info!(removed, "removed invalid groups");
            self.settings.save()?;
        }
        Ok(removed)
    }

    pub fn settings(&self) -> &DistributionSettings {
        self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TempProject;
    use cairn_core::ContentHash;

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_assign_scenario() {
        let project = TempProject::with_files(&["Assets/Art/sword.png"]);
        let db = project.database();
        let mut settings = DistributionSettings::new();
        settings.groups.push(DistributionGroup::new("Weapons"));

        let mut engine = AssignmentEngine::new(&mut settings, &db);
        let address = engine
            .assign("Assets/Art/sword.png", "Weapons", &labels(&["common", "weapon"]), Some("wp_"))
            .unwrap();
        assert_eq!(address, "wp_sword");

        let (group, entry) = settings
            .find_entry(&ContentHash::for_asset_path("Assets/Art/sword.png"))
            .unwrap();
        assert_eq!(group.name, "Weapons");
        assert_eq!(entry.address, "wp_sword");
        assert!(entry.labels.contains("common"));
        assert!(entry.labels.contains("weapon"));
    }

    #[test]
    fn test_assign_is_idempotent() {
        let project = TempProject::with_files(&["Assets/Deep/Nested/Dir/shield.png"]);
        let db = project.database();
        let mut settings = DistributionSettings::new();
        settings.groups.push(DistributionGroup::new("Armor"));

        let mut engine = AssignmentEngine::new(&mut settings, &db);
        engine
            .assign("Assets/Deep/Nested/Dir/shield.png", "Armor", &labels(&["armor"]), None)
            .unwrap();
        let first = engine.settings().clone();
        engine
            .assign("Assets/Deep/Nested/Dir/shield.png", "Armor", &labels(&["armor"]), None)
            .unwrap();

        assert_eq!(*engine.settings(), first);
        assert_eq!(engine.settings().entry_count(), 1);
        let (_, entry) = first
            .find_entry(&ContentHash::for_asset_path("Assets/Deep/Nested/Dir/shield.png"))
            .unwrap();
        assert_eq!(entry.address, "shield");
    }

    #[test]
    fn test_labels_are_added_not_replaced() {
        let project = TempProject::with_files(&["Assets/Art/sword.png"]);
        let db = project.database();
        let mut settings = DistributionSettings::new();
        settings.groups.push(DistributionGroup::new("Weapons"));

        let mut engine = AssignmentEngine::new(&mut settings, &db);
        engine.assign("Assets/Art/sword.png", "Weapons", &labels(&["old"]), None).unwrap();
        engine.assign("Assets/Art/sword.png", "Weapons", &labels(&["new"]), None).unwrap();
        engine.assign("Assets/Art/sword.png", "Weapons", &[], None).unwrap();

        let (_, entry) = settings
            .find_entry(&ContentHash::for_asset_path("Assets/Art/sword.png"))
            .unwrap();
        assert_eq!(entry.labels.len(), 2);
    }

    #[test]
    fn test_get_group_force_create() {
        let project = TempProject::with_files(&[]);
        let db = project.database();
        let mut settings = DistributionSettings::new();
        let mut engine = AssignmentEngine::new(&mut settings, &db);

        assert!(matches!(
            engine.get_group("X", false),
            Err(CairnError::GroupNotFound(name)) if name == "X"
        ));
        let created = engine.get_group("X", true).unwrap();
        assert_eq!(created.name, "X");
        assert_eq!(created.schema.as_ref().unwrap().load_path, "LocalLoadPath");

        assert_eq!(engine.get_group("X", false).unwrap().name, "X");
        assert_eq!(engine.settings().groups.len(), 1);
    }

    #[test]
    fn test_create_without_template_fails() {
        let project = TempProject::with_files(&[]);
        let db = project.database();
        let mut settings = DistributionSettings::new();
        settings.templates.clear();
        let mut engine = AssignmentEngine::new(&mut settings, &db);

        assert!(matches!(
            engine.get_group("X", true),
            Err(CairnError::NoGroupTemplate(_))
        ));
    }

    #[test]
    fn test_search_group() {
        let project = TempProject::with_files(&[]);
        let db = project.database();
        let mut settings = DistributionSettings::new();
        settings.groups.push(DistributionGroup::new("Characters_Remote"));
        settings.groups.push(DistributionGroup::new("Weapons_Remote"));
        let engine = AssignmentEngine::new(&mut settings, &db);

        assert_eq!(engine.search_group("Remote").unwrap().name, "Characters_Remote");
        assert_eq!(engine.search_group("Weap").unwrap().name, "Weapons_Remote");
        assert!(matches!(
            engine.search_group("Audio"),
            Err(CairnError::GroupKeywordNotFound(_))
        ));
    }

    #[test]
    fn test_apply_keyword_target() {
        let project = TempProject::with_files(&["Assets/Audio/theme.ogg"]);
        let db = project.database();
        let mut settings = DistributionSettings::new();
        settings.groups.push(DistributionGroup::new("Audio_Remote"));
        let mut engine = AssignmentEngine::new(&mut settings, &db);

        let decision = AssignmentDecision::to_group_matching("Audio").with_labels(["bgm"]);
        let (group, address) = engine.apply("Assets/Audio/theme.ogg", &decision).unwrap();
        assert_eq!(group, "Audio_Remote");
        assert_eq!(address, "theme");
    }

    #[test]
    fn test_assign_to_missing_group_is_lookup_error() {
        let project = TempProject::with_files(&["Assets/Art/sword.png"]);
        let db = project.database();
        let mut settings = DistributionSettings::new();
        let mut engine = AssignmentEngine::new(&mut settings, &db);

        assert!(matches!(
            engine.assign("Assets/Art/sword.png", "Nope", &[], None),
            Err(CairnError::GroupNotFound(_))
        ));
        assert_eq!(settings.entry_count(), 0);
    }

    #[test]
    fn test_prune_removes_exactly_stale_entries() {
        let project = TempProject::with_files(&["Assets/Art/keep.png", "Assets/Art/gone.png"]);
        let db = project.database();
        let mut settings = DistributionSettings::new();
        settings.groups.push(DistributionGroup::new("Art"));

        let mut engine = AssignmentEngine::new(&mut settings, &db);
        engine.assign("Assets/Art/keep.png", "Art", &[], Some("art_")).unwrap();
        engine.assign("Assets/Art/gone.png", "Art", &[], None).unwrap();
        project.remove("Assets/Art/gone.png");

        assert_eq!(engine.prune_stale_entries().unwrap(), 1);
        let after_first = engine.settings().clone();
        assert_eq!(engine.prune_stale_entries().unwrap(), 0);
        assert_eq!(*engine.settings(), after_first);

        let group = after_first.group("Art").unwrap();
        assert_eq!(group.entries.len(), 1);
        assert_eq!(group.entries[0].address, "art_keep");
    }

    #[test]
    fn test_prune_restores_basename_address() {
        let project = TempProject::with_files(&["Assets/Art/tree.png"]);
        let db = project.database();
        let mut settings = DistributionSettings::new();
        settings.groups.push(DistributionGroup::new("Art"));
        let guid = ContentHash::for_asset_path("Assets/Art/tree.png");
        settings.create_or_move_entry(guid, "Assets/Art/tree.png", "Art");

        let mut engine = AssignmentEngine::new(&mut settings, &db);
        engine.prune_stale_entries().unwrap();

        assert_eq!(settings.find_entry(&guid).unwrap().1.address, "tree");
    }

    #[test]
    fn test_root_level_asset_is_rejected_before_placement() {
        let project = TempProject::with_files(&["readme.json"]);
        let db = project.database();
        let mut settings = DistributionSettings::new();
        settings.groups.push(DistributionGroup::new("Data"));

        let mut engine = AssignmentEngine::new(&mut settings, &db);
        assert!(matches!(
            engine.assign("readme.json", "Data", &labels(&["docs"]), None),
            Err(CairnError::InvalidAssetPath { .. })
        ));
        assert_eq!(engine.settings().entry_count(), 0);
        assert_eq!(engine.prune_stale_entries().unwrap(), 0);
    }

    #[test]
    fn test_prune_survives_unaddressable_entry() {
        let project = TempProject::with_files(&["readme.json", "Assets/Art/tree.png"]);
        let db = project.database();
        let mut settings = DistributionSettings::new();
        settings.groups.push(DistributionGroup::new("Art"));
        for asset_path in ["readme.json", "Assets/Art/tree.png"] {
            let guid = ContentHash::for_asset_path(asset_path);
            settings.create_or_move_entry(guid, asset_path, "Art");
        }

        let mut engine = AssignmentEngine::new(&mut settings, &db);
        assert_eq!(engine.prune_stale_entries().unwrap(), 0);

        let group = settings.group("Art").unwrap();
        assert_eq!(group.entries.len(), 2);
        let tree = settings
            .find_entry(&ContentHash::for_asset_path("Assets/Art/tree.png"))
            .unwrap()
            .1;
        assert_eq!(tree.address, "tree");
    }

    #[test]
    fn test_remove_invalid_groups() {
        let project = TempProject::with_files(&[]);
        let db = project.database();
        let mut settings = DistributionSettings::new();
        settings.groups.push(DistributionGroup::new(""));
        settings.groups.push(DistributionGroup::new("Weapons"));
        settings.groups.push(DistributionGroup::new("  "));

        let mut engine = AssignmentEngine::new(&mut settings, &db);
        assert_eq!(engine.remove_invalid_groups().unwrap(), 2);
        assert_eq!(engine.remove_invalid_groups().unwrap(), 0);
        assert_eq!(settings.groups.len(), 1);
    }
}
