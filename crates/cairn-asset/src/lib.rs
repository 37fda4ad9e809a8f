//! Cairn Asset - Path-driven distribution settings
//!
//! This crate decides which distribution group, labels and address every asset
//! gets. Configurators are registered against path prefixes; the resolver picks
//! one per asset path (after exclusion filtering) and the assignment engine
//! applies its decision to the persisted distribution settings.

mod assign;
mod config;
mod database;
mod exclusion;
mod registry;
mod resolver;
mod rules;
mod settings;
mod types;

#[cfg(test)]
mod test_support;

pub use assign::AssignmentEngine;
pub use config::{ProjectConfig, ProjectSection};
pub use database::{AssetDatabase, FsAssetDatabase};
pub use exclusion::ExclusionFilter;
pub use registry::{
    AssetConfigurator, AssignmentDecision, ConfiguratorBinding, ConfiguratorRegistry, Decision,
    GroupTarget,
};
pub use resolver::{
    AutoSettings, BatchReport, ConfigureFailure, ConfigureOutcome, DirectoryScan, ReloadReport,
    SkipReason,
};
pub use rules::{RuleConfig, RuleConfigurator};
pub use settings::{
    AssetEntry, BundleSchema, DistributionGroup, DistributionSettings, GroupTemplate,
};
pub use types::{AssetInfo, AssetType};
