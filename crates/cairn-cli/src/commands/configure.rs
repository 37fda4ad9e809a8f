//! Reload and configure commands

use super::load_config;
use anyhow::{Context, Result};
use cairn_asset::{AssetType, BatchReport, DirectoryScan};
use std::path::Path;

pub fn run_reload(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let mut auto = config.open_auto_settings()?;
    let report = auto.reload().context("Reload failed")?;

    println!(
        "Pruned {} stale entries, removed {} invalid groups",
        report.pruned, report.invalid_groups_removed
    );
    print_batch(&report.batch);
    Ok(())
}

pub fn run_configure(config_path: &Path, paths: &[String]) -> Result<()> {
    let config = load_config(config_path)?;
    let mut auto = config.open_auto_settings()?;
    let report = auto.on_assets_changed(paths, &[]);
    print_batch(&report);
    Ok(())
}

pub fn run_configure_dir(
    config_path: &Path,
    root: &str,
    ignore_strings: Vec<String>,
    ignore_types: Vec<AssetType>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let mut auto = config.open_auto_settings()?;
    let scan = DirectoryScan {
        ignore_strings,
        ignore_types,
    };
    let report = auto
        .auto_configure_directory(root, &scan)
        .with_context(|| format!("Failed to configure {}", root))?;
    print_batch(&report);
    Ok(())
}

fn print_batch(report: &BatchReport) {
    println!(
        "Applied: {}  Skipped: {}  Ignored: {}  Failed: {}",
        report.applied,
        report.skipped,
        report.ignored,
        report.failed.len() + report.errors.len()
    );
    for failure in &report.failed {
        println!("  {}", failure);
    }
    for (path, error) in &report.errors {
        println!("  {}: {}", path, error);
    }
}
