//! Build commands

use super::load_config;
use anyhow::{Context, Result};
use cairn_asset::{DistributionSettings, ProjectConfig};
use cairn_build::{resource_types, BuildParameterStore, BuildTrigger, CatalogPipeline};
use std::path::{Path, PathBuf};
use tracing::error;

pub struct BuildArgs {
    pub config: PathBuf,
    pub asset_type: String,
    pub version_code: String,
    pub target_env: Option<String>,
    pub reload: bool,
}

/// Run a remote catalog build, exiting with status 1 when it fails
pub fn run(args: BuildArgs) -> Result<()> {
    if let Err(e) = try_build(&args) {
        error!(asset_type = %args.asset_type, "{:#}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn try_build(args: &BuildArgs) -> Result<()> {
    let config = load_config(&args.config)?;

    if args.reload {
        config
            .open_auto_settings()?
            .reload()
            .context("Reload before build failed")?;
    }

    let (mut settings, mut params, mut pipeline) = open_build(&config)?;
    let report = BuildTrigger::new(&mut settings, &mut params, &mut pipeline).build(
        &args.asset_type,
        &args.version_code,
        args.target_env.as_deref(),
    )?;

    println!("Catalog: {}", report.catalog_path.display());
    println!("Locator: {}", report.locator_id);
    println!("Entries: {}", report.entries);
    let remote = params.remote_path()?;
    if !remote.is_empty() {
        println!("Remote:  {}", remote);
    }
    Ok(())
}

pub fn run_game_settings(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let (mut settings, mut params, mut pipeline) = open_build(&config)?;
    let default_group =
        BuildTrigger::new(&mut settings, &mut params, &mut pipeline).prepare_game_build()?;

    match default_group {
        Some(group) => println!("Default group: {}", group),
        None => println!("No group matches the local profile"),
    }
    Ok(())
}

pub fn run_types(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let settings = DistributionSettings::open(config.settings_path())?;
    let types = resource_types(&settings);

    if types.is_empty() {
        println!("No resource types defined in the profile");
    }
    for name in types {
        println!("{}", name);
    }
    Ok(())
}

fn open_build(
    config: &ProjectConfig,
) -> Result<(DistributionSettings, BuildParameterStore, CatalogPipeline)> {
    let settings = DistributionSettings::open(config.settings_path()).with_context(|| {
        format!(
            "Failed to open settings {}",
            config.settings_path().display()
        )
    })?;
    let params = BuildParameterStore::new(config.build_parameters_path());
    let pipeline = CatalogPipeline::new(config.root_dir(), config.output_dir());
    Ok((settings, params, pipeline))
}
