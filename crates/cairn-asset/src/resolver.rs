//! Path resolution and the auto-settings passes
//!
//! [`AutoSettings`] is the context every configuration entry point runs
//! against: exclusion filter, configurator registry, asset database and the
//! distribution settings they mutate. Expected outcomes (skips and naming
//! mismatches) come back as [`ConfigureOutcome`] values; only lookup and IO
//! failures are errors.

use crate::assign::AssignmentEngine;
use crate::database::AssetDatabase;
use crate::exclusion::ExclusionFilter;
use crate::registry::{ConfiguratorRegistry, Decision};
use crate::settings::DistributionSettings;
use crate::types::AssetType;
use cairn_core::{path, Result};
use std::fmt;
use tracing::{debug, info, warn};

/// Why an asset was left alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Under an excluded root
    Excluded,
    /// Missing, a folder, or of no recognized type
    Unsupported,
    /// No configurator prefix matches the path
    NoConfigurator,
    /// The configurator chose not to assign anything
    Declined,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SkipReason::Excluded => "excluded",
            SkipReason::Unsupported => "unsupported",
            SkipReason::NoConfigurator => "no configurator",
            SkipReason::Declined => "declined",
        };
        f.write_str(reason)
    }
}

/// A per-asset failure that does not abort a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigureFailure {
    NamingMismatch {
        asset_name: String,
        asset_path: String,
        message: String,
    },
}

impl fmt::Display for ConfigureFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigureFailure::NamingMismatch {
                asset_name,
                asset_path,
                message,
            } => write!(f, "{} ({}): {}", asset_name, asset_path, message),
        }
    }
}

/// Result of configuring one asset path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigureOutcome {
    Applied { group: String, address: String },
    Skipped(SkipReason),
    Failed(ConfigureFailure),
}

/// Filters for a directory scan
#[derive(Debug, Clone, Default)]
pub struct DirectoryScan {
    /// Files whose path contains any of these are not visited
    pub ignore_strings: Vec<String>,
    /// Assets of these types are not visited
    pub ignore_types: Vec<AssetType>,
}

/// Tally of a batch pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub applied: usize,
    pub skipped: usize,
    pub failed: Vec<ConfigureFailure>,
    /// Files the scan filters dropped before resolution
    pub ignored: usize,
    /// Paths whose configuration raised an error, with the message
    pub errors: Vec<(String, String)>,
}

impl BatchReport {
    fn record(&mut self, outcome: ConfigureOutcome) {
        match outcome {
            ConfigureOutcome::Applied { .. } => self.applied += 1,
            ConfigureOutcome::Skipped(_) => self.skipped += 1,
            ConfigureOutcome::Failed(failure) => self.failed.push(failure),
        }
    }

    fn merge(&mut self, other: BatchReport) {
        self.applied += other.applied;
        self.skipped += other.skipped;
        self.ignored += other.ignored;
        self.failed.extend(other.failed);
        self.errors.extend(other.errors);
    }
}

/// Outcome of a full reload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReloadReport {
    pub pruned: usize,
    pub invalid_groups_removed: usize,
    pub batch: BatchReport,
}

/// Context for automatic distribution-settings assignment
pub struct AutoSettings {
    exclusions: ExclusionFilter,
    registry: ConfiguratorRegistry,
    database: Box<dyn AssetDatabase>,
    settings: DistributionSettings,
}

impl AutoSettings {
    pub fn new(
        exclusions: ExclusionFilter,
        registry: ConfiguratorRegistry,
        database: Box<dyn AssetDatabase>,
        settings: DistributionSettings,
    ) -> Self {
        Self {
            exclusions,
            registry,
            database,
            settings,
        }
    }

    pub fn settings(&self) -> &DistributionSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut DistributionSettings {
        &mut self.settings
    }

    pub fn registry(&self) -> &ConfiguratorRegistry {
        &self.registry
    }

    pub fn exclusions(&self) -> &ExclusionFilter {
        &self.exclusions
    }

    /// An assignment engine over this context's settings and database
    pub fn engine(&mut self) -> AssignmentEngine<'_> {
        AssignmentEngine::new(&mut self.settings, self.database.as_ref())
    }

    /// Resolve a configurator for one asset path and apply its decision
    pub fn auto_configure(&mut self, asset_path: &str) -> Result<ConfigureOutcome> {
        let asset_path = path::normalize(asset_path);

        if self.exclusions.is_excluded(&asset_path) {
            debug!(asset = %asset_path, "skipped: excluded");
            return Ok(ConfigureOutcome::Skipped(SkipReason::Excluded));
        }

        match self.database.load(&asset_path) {
            Some(info) if info.asset_type.is_supported() => {}
            _ => {
                debug!(asset = %asset_path, "skipped: unsupported");
                return Ok(ConfigureOutcome::Skipped(SkipReason::Unsupported));
            }
        }

        let decision = match self.registry.resolve(&asset_path) {
            Some(configurator) => configurator.configure(&asset_path),
            None => {
                debug!(asset = %asset_path, "skipped: no configurator");
                return Ok(ConfigureOutcome::Skipped(SkipReason::NoConfigurator));
            }
        };

        match decision {
            Decision::Assign(decision) => {
                let (group, address) = self.engine().apply(&asset_path, &decision)?;
                debug!(asset = %asset_path, group = %group, address = %address, "applied");
                Ok(ConfigureOutcome::Applied { group, address })
            }
            Decision::Skip => {
                debug!(asset = %asset_path, "skipped: declined by configurator");
                Ok(ConfigureOutcome::Skipped(SkipReason::Declined))
            }
            Decision::Reject(message) => {
                let asset_name =
                    path::asset_name(&asset_path, true).unwrap_or_else(|_| asset_path.clone());
                warn!(asset_name = %asset_name, asset_path = %asset_path, "{}", message);
                Ok(ConfigureOutcome::Failed(ConfigureFailure::NamingMismatch {
                    asset_name,
                    asset_path,
                    message,
                }))
            }
        }
    }

    /// Configure every file under `root`, continuing past skips and mismatches
    ///
    /// Lookup errors (a rule naming a group that does not exist) abort the scan.
    pub fn auto_configure_directory(
        &mut self,
        root: &str,
        scan: &DirectoryScan,
    ) -> Result<BatchReport> {
        let mut report = BatchReport::default();

        for file in self.database.files_under(root)? {
            if scan.ignore_strings.iter().any(|s| file.contains(s.as_str())) {
                report.ignored += 1;
                continue;
            }
            let ignored_type = match self.database.load(&file) {
                Some(info) => scan.ignore_types.contains(&info.asset_type),
                None => true,
            };
            if ignored_type {
                report.ignored += 1;
                continue;
            }

            report.record(self.auto_configure(&file)?);
        }

        debug!(
            root,
            applied = report.applied,
            skipped = report.skipped,
            failed = report.failed.len(),
            "directory configured"
        );
        Ok(report)
    }

    /// Configure imported and moved assets
    ///
    /// Errors are logged and recorded per path; the loop always runs to the end.
    pub fn on_assets_changed<S: AsRef<str>>(&mut self, imported: &[S], moved: &[S]) -> BatchReport {
        let mut report = BatchReport::default();

        for asset_path in imported.iter().chain(moved) {
            let asset_path = asset_path.as_ref();
            match self.auto_configure(asset_path) {
                Ok(outcome) => report.record(outcome),
                Err(e) => {
                    warn!(asset = asset_path, error = %e, "failed to configure asset");
                    report.errors.push((asset_path.to_string(), e.to_string()));
                }
            }
        }

        report
    }

    /// Prune, rescan every registered prefix and tidy up groups
    pub fn reload(&mut self) -> Result<ReloadReport> {
        let mut report = ReloadReport {
            pruned: self.engine().prune_stale_entries()?,
            invalid_groups_removed: self.engine().remove_invalid_groups()?,
            ..ReloadReport::default()
        };

        let prefixes: Vec<String> = self
            .registry
            .prefixes()
            .into_iter()
            .map(str::to_string)
            .collect();
        for prefix in &prefixes {
            let batch = self.auto_configure_directory(prefix, &DirectoryScan::default())?;
            report.batch.merge(batch);
        }

        report.invalid_groups_removed += self.engine().remove_invalid_groups()?;
        self.settings.save()?;

        info!(
            pruned = report.pruned,
            applied = report.batch.applied,
            skipped = report.batch.skipped,
            failed = report.batch.failed.len(),
            "reload complete"
        );
        Ok(report)
    }
}

impl fmt::Debug for AutoSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoSettings")
            .field("exclusions", &self.exclusions)
            .field("registry", &self.registry)
            .field("groups", &self.settings.groups.len())
            .finish_non_exhaustive()
    }
}
