//! Build profile selection
//!
//! Profile variables are name/value pairs in the distribution settings.
//! Variables whose name contains `Version` name the buildable resource types
//! (`ClientMasterVersion` is the `ClientMaster` type); the others hold build
//! and load paths per type (`ClientMasterBuildPath`, `ClientMasterLoadPath`).

use cairn_asset::DistributionSettings;
use tracing::debug;

const VERSION_MARKER: &str = "Version";

/// Build and load path values selected for one resource type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildProfile {
    pub build_path: Option<String>,
    pub load_path: Option<String>,
}

/// The resource types that can be built
pub fn resource_types(settings: &DistributionSettings) -> Vec<String> {
    settings
        .profile
        .keys()
        .filter(|name| name.contains(VERSION_MARKER))
        .map(|name| name.replace(VERSION_MARKER, ""))
        .collect()
}

/// Pick the build and load path values for `keyword` (case-insensitive)
pub fn select_profile(settings: &DistributionSettings, keyword: &str) -> BuildProfile {
    let keyword = keyword.to_lowercase();
    let mut profile = BuildProfile::default();

    for (name, value) in &settings.profile {
        if name.contains(VERSION_MARKER) || !name.to_lowercase().contains(&keyword) {
            continue;
        }
        if name.contains("BuildPath") {
            profile.build_path = Some(value.clone());
        } else if name.contains("LoadPath") {
            profile.load_path = Some(value.clone());
        }
    }

    profile
}

/// Include exactly the groups whose load path matches the profile
///
/// The first included group becomes the default group and supplies the
/// remote catalog paths. Those are cleared first, so they stay unset when
/// no group matches. Returns the default group's name, if any group was
/// included.
pub fn apply_profile(
    settings: &mut DistributionSettings,
    profile: &BuildProfile,
    build_remote_catalog: bool,
) -> Option<String> {
    settings.build_remote_catalog = build_remote_catalog;
    settings.default_group = None;
    settings.remote_catalog_build_path = None;
    settings.remote_catalog_load_path = None;
    let mut default_group = None;

    for group in settings.groups.iter_mut().filter(|g| g.is_valid()) {
        let Some(schema) = group.schema.as_mut() else {
            continue;
        };

        schema.include_in_build = profile.load_path.as_deref() == Some(schema.load_path.as_str());
        if schema.include_in_build && default_group.is_none() {
            settings.remote_catalog_build_path = Some(schema.build_path.clone());
            settings.remote_catalog_load_path = Some(schema.load_path.clone());
            default_group = Some(group.name.clone());
        }
        debug!(group = %group.name, included = schema.include_in_build, "profile applied");
    }

    settings.default_group = default_group.clone();
    default_group
}

/// Expand a path that may name a profile variable, substituting `[VersionCode]`
pub fn evaluate(settings: &DistributionSettings, value: &str, version_code: &str) -> String {
    settings
        .profile
        .get(value)
        .map(String::as_str)
        .unwrap_or(value)
        .replace("[VersionCode]", version_code)
}
