//! Build pipelines

use crate::profile::evaluate;
use cairn_asset::DistributionSettings;
use cairn_core::{path, CairnError, CatalogDocument, CatalogEntry, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What a build produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub catalog_path: PathBuf,
    pub locator_id: String,
    pub entries: usize,
}

/// Packages the included groups of the distribution settings
pub trait BuildPipeline {
    /// Remove intermediate build state
    fn clean(&mut self) -> Result<()>;

    fn build(&mut self, settings: &DistributionSettings, version_code: &str)
        -> Result<BuildReport>;
}

/// Copies included content next to a JSON catalog under the output directory
///
/// Output layout below `<output>/<remote catalog build path>`:
/// `catalog_<version>.json` and `content/<version>/<group>/<file>`.
/// Everything is assembled in `<output>/.staging` first and moved into place
/// once the whole build succeeded.
#[derive(Debug, Clone)]
pub struct CatalogPipeline {
    asset_root: PathBuf,
    output: PathBuf,
}

impl CatalogPipeline {
    pub fn new<A: AsRef<Path>, O: AsRef<Path>>(asset_root: A, output: O) -> Self {
        Self {
            asset_root: asset_root.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
        }
    }

    fn staging_dir(&self) -> PathBuf {
        self.output.join(".staging")
    }

    fn collect_entries(
        &self,
        settings: &DistributionSettings,
        version_code: &str,
        staging: &Path,
    ) -> Result<Vec<CatalogEntry>> {
        let mut entries = Vec::new();

        for group in settings.groups.iter().filter(|g| g.is_valid()) {
            let included = group.schema.as_ref().is_some_and(|s| s.include_in_build);
            if !included {
                continue;
            }

            for entry in &group.entries {
                let source = self.asset_root.join(&entry.asset_path);
                if !source.is_file() {
                    return Err(CairnError::BuildError(format!(
                        "asset \"{}\" in group \"{}\" does not exist",
                        entry.asset_path, group.name
                    )));
                }

                let relative = format!(
                    "content/{}/{}/{}",
                    version_code,
                    group.name,
                    path::asset_name(&entry.asset_path, true)?
                );
                let staged = staging.join(&relative);
                if let Some(parent) = staged.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::copy(&source, &staged)?;
                debug!(address = %entry.address, path = %relative, "staged");

                entries.push(CatalogEntry {
                    address: entry.address.clone(),
                    path: relative,
                    group: group.name.clone(),
                    labels: entry.labels.iter().cloned().collect(),
                });
            }
        }

        Ok(entries)
    }
}

impl BuildPipeline for CatalogPipeline {
    fn clean(&mut self) -> Result<()> {
        let staging = self.staging_dir();
        if staging.exists() {
            fs::remove_dir_all(&staging)?;
            debug!(path = %staging.display(), "removed staging directory");
        }
        Ok(())
    }

    fn build(
        &mut self,
        settings: &DistributionSettings,
        version_code: &str,
    ) -> Result<BuildReport> {
        let build_path = settings.remote_catalog_build_path.as_deref().ok_or_else(|| {
            CairnError::BuildError(
                "no remote catalog build path; no group matches the build profile".to_string(),
            )
        })?;
        let target = self.output.join(evaluate(settings, build_path, version_code));
        let staging = self.staging_dir();

        let entries = self.collect_entries(settings, version_code, &staging)?;
        let catalog_name = format!("catalog_{}.json", version_code);
        let document = CatalogDocument {
            locator_id: format!("{}/{}", build_path, catalog_name),
            version_code: version_code.to_string(),
            entries,
        };
        document.save(&staging.join(&catalog_name))?;

        let content = Path::new("content").join(version_code);
        let final_content = target.join(&content);
        if final_content.exists() {
            fs::remove_dir_all(&final_content)?;
        }
        if let Some(parent) = final_content.parent() {
            fs::create_dir_all(parent)?;
        }
        if staging.join(&content).exists() {
            fs::rename(staging.join(&content), &final_content)?;
        }
        let catalog_path = target.join(&catalog_name);
        fs::rename(staging.join(&catalog_name), &catalog_path)?;

        info!(
            catalog = %catalog_path.display(),
            entries = document.entries.len(),
            "catalog built"
        );
        Ok(BuildReport {
            catalog_path,
            locator_id: document.locator_id,
            entries: document.entries.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_asset::{BundleSchema, DistributionGroup};
    use cairn_core::ContentHash;

    struct TempDir(PathBuf);

    impl TempDir {
        fn new() -> Self {
            let dir = std::env::temp_dir().join(format!("cairn_test_{}", uuid::Uuid::new_v4()));
            fs::create_dir_all(&dir).unwrap();
            Self(dir)
        }

        fn write(&self, relative: &str) {
            let full = self.0.join(relative);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, relative).unwrap();
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            fs::remove_dir_all(&self.0).ok();
        }
    }

    fn settings_with(paths: &[&str]) -> DistributionSettings {
        let mut settings = DistributionSettings::new();
        let mut group = DistributionGroup::new("Weapons");
        group.schema = Some(BundleSchema {
            build_path: "RemoteBuildPath".into(),
            load_path: "RemoteLoadPath".into(),
            include_in_build: true,
        });
        settings.groups.push(group);
        let mut excluded = DistributionGroup::new("Builtin");
        excluded.schema = Some(BundleSchema {
            build_path: "LocalBuildPath".into(),
            load_path: "LocalLoadPath".into(),
            include_in_build: false,
        });
        settings.groups.push(excluded);

        for asset_path in paths {
            let guid = ContentHash::for_asset_path(asset_path);
            settings.create_or_move_entry(guid, asset_path, "Weapons");
            let entry = settings.group_mut("Weapons").unwrap().entry_mut(&guid).unwrap();
            entry.address = path::address_for(asset_path, Some("wp_")).unwrap();
            entry.labels.insert("weapon".into());
        }
        settings
            .profile
            .insert("RemoteBuildPath".into(), "remote/[VersionCode]".into());
        settings.remote_catalog_build_path = Some("RemoteBuildPath".into());
        settings
    }

    #[test]
    fn test_build_writes_catalog_and_content() {
        let project = TempDir::new();
        project.write("Assets/Art/sword.png");
        let output = TempDir::new();
        let settings = settings_with(&["Assets/Art/sword.png"]);

        let mut pipeline = CatalogPipeline::new(&project.0, &output.0);
        let report = pipeline.build(&settings, "0.0.2").unwrap();

        assert_eq!(report.catalog_path, output.0.join("remote/0.0.2/catalog_0.0.2.json"));
        assert_eq!(report.entries, 1);

        let catalog = CatalogDocument::load(&report.catalog_path).unwrap();
        let entry = catalog.find("wp_sword").unwrap();
        assert_eq!(entry.group, "Weapons");
        assert_eq!(entry.labels, vec!["weapon"]);
        let content = report.catalog_path.parent().unwrap().join(&entry.path);
        assert_eq!(fs::read_to_string(content).unwrap(), "Assets/Art/sword.png");

        pipeline.clean().unwrap();
        assert!(!output.0.join(".staging").exists());
    }

    #[test]
    fn test_missing_asset_fails() {
        let project = TempDir::new();
        let output = TempDir::new();
        let settings = settings_with(&["Assets/Art/ghost.png"]);

        let mut pipeline = CatalogPipeline::new(&project.0, &output.0);
        assert!(matches!(
            pipeline.build(&settings, "0.0.2"),
            Err(CairnError::BuildError(_))
        ));
        assert!(!output.0.join("remote").exists());
    }

    #[test]
    fn test_build_without_profile_fails() {
        let project = TempDir::new();
        let output = TempDir::new();
        let mut settings = settings_with(&[]);
        settings.remote_catalog_build_path = None;

        let mut pipeline = CatalogPipeline::new(&project.0, &output.0);
        assert!(matches!(
            pipeline.build(&settings, "0.0.2"),
            Err(CairnError::BuildError(_))
        ));
    }
}
