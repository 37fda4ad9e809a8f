//! Build entry points

use crate::params::BuildParameterStore;
use crate::pipeline::{BuildPipeline, BuildReport};
use crate::profile::{apply_profile, select_profile};
use cairn_asset::DistributionSettings;
use cairn_core::{CairnError, Result};
use tracing::{error, info, warn};

/// Profile used for builds shipped inside the game itself
const GAME_BUILD_PROFILE: &str = "Local";

/// Drives a build over the distribution settings and build parameters
pub struct BuildTrigger<'a> {
    settings: &'a mut DistributionSettings,
    parameters: &'a mut BuildParameterStore,
    pipeline: &'a mut dyn BuildPipeline,
}

impl<'a> BuildTrigger<'a> {
    pub fn new(
        settings: &'a mut DistributionSettings,
        parameters: &'a mut BuildParameterStore,
        pipeline: &'a mut dyn BuildPipeline,
    ) -> Self {
        Self {
            settings,
            parameters,
            pipeline,
        }
    }

    /// Build the remote content for one resource type
    ///
    /// Any failure after profile selection comes back as `CairnError::BuildError`.
    pub fn build(
        &mut self,
        asset_type: &str,
        version_code: &str,
        target_env: Option<&str>,
    ) -> Result<BuildReport> {
        self.pipeline.clean()?;

        let profile = select_profile(self.settings, asset_type);
        if profile.load_path.is_none() {
            return Err(CairnError::BuildError(format!(
                "no profile load path matches asset type \"{}\"",
                asset_type
            )));
        }

        self.parameters.set_version_code(version_code)?;
        if let Some(env) = target_env.filter(|e| !e.is_empty()) {
            self.parameters.set_remote_target_env(env)?;
        }

        let Some(default_group) = apply_profile(self.settings, &profile, true) else {
            let err = CairnError::BuildError(format!(
                "no group uses the load path of asset type \"{}\"",
                asset_type
            ));
            error!(asset_type, version_code, error = %err, "build failed");
            return Err(err);
        };
        self.settings.save()?;
        info!(asset_type, version_code, default_group = %default_group, "building");

        let result = self
            .pipeline
            .build(self.settings, version_code)
            .map_err(|e| match e {
                CairnError::BuildError(_) => e,
                other => CairnError::BuildError(other.to_string()),
            });
        let cleaned = self.pipeline.clean();

        match result {
            Ok(report) => {
                cleaned?;
                Ok(report)
            }
            Err(e) => {
                if let Err(clean_err) = cleaned {
                    warn!(error = %clean_err, "cleanup after failed build did not complete");
                }
                error!(asset_type, version_code, error = %e, "build failed");
                Err(e)
            }
        }
    }

    /// Point the settings at the local profile without building
    ///
    /// Returns the new default group.
    pub fn prepare_game_build(&mut self) -> Result<Option<String>> {
        self.pipeline.clean()?;

        let profile = select_profile(self.settings, GAME_BUILD_PROFILE);
        let default_group = apply_profile(self.settings, &profile, false);
        self.settings.save()?;

        info!(
            default_group = default_group.as_deref().unwrap_or("none"),
            "game build settings applied"
        );
        Ok(default_group)
    }
}
