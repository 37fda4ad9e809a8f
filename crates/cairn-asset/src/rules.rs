//! Rule-driven configurators declared in `cairn.toml`

use crate::registry::{AssetConfigurator, AssignmentDecision, Decision};
use cairn_core::{path, CairnError, Result};
use serde::{Deserialize, Serialize};

/// A `[[rule]]` table: where it applies and what it assigns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Path prefix this rule is responsible for
    pub path: String,
    /// Exact target group name
    #[serde(default)]
    pub group: Option<String>,
    /// Target the first group whose name contains this keyword
    #[serde(default)]
    pub group_keyword: Option<String>,
    /// Create `group` from the first template when it does not exist
    #[serde(default)]
    pub create_group: bool,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub address_prefix: Option<String>,
    /// Asset names must start with this
    #[serde(default)]
    pub name_prefix: Option<String>,
    /// Asset names must end with this
    #[serde(default)]
    pub name_suffix: Option<String>,
}

/// Configurator built from a [`RuleConfig`]
#[derive(Debug, Clone)]
pub struct RuleConfigurator {
    decision: AssignmentDecision,
    name_prefix: Option<String>,
    name_suffix: Option<String>,
}

impl RuleConfigurator {
    pub fn new(rule: &RuleConfig) -> Result<Self> {
        let mut decision = match (&rule.group, &rule.group_keyword) {
            (Some(group), None) => {
                let decision = AssignmentDecision::to_group(group.clone());
                if rule.create_group {
                    decision.create_group()
                } else {
                    decision
                }
            }
            (None, Some(keyword)) => AssignmentDecision::to_group_matching(keyword.clone()),
            _ => {
                return Err(CairnError::ConfigError(format!(
                    "rule for \"{}\" must set exactly one of `group` or `group_keyword`",
                    rule.path
                )))
            }
        }
        .with_labels(rule.labels.iter().cloned());
        decision.address_prefix = rule.address_prefix.clone();

        Ok(Self {
            decision,
            name_prefix: rule.name_prefix.clone(),
            name_suffix: rule.name_suffix.clone(),
        })
    }

    fn naming_violation(&self, name: &str) -> Option<String> {
        if let Some(prefix) = &self.name_prefix {
            if !name.starts_with(prefix.as_str()) {
                return Some(format!("expected asset name to start with \"{}\"", prefix));
            }
        }
        if let Some(suffix) = &self.name_suffix {
            if !name.ends_with(suffix.as_str()) {
                return Some(format!("expected asset name to end with \"{}\"", suffix));
            }
        }
        None
    }
}

impl AssetConfigurator for RuleConfigurator {
    fn configure(&self, asset_path: &str) -> Decision {
        let name = match path::asset_name(asset_path, false) {
            Ok(name) => name,
            Err(e) => return Decision::Reject(e.to_string()),
        };

        match self.naming_violation(&name) {
            Some(reason) => Decision::Reject(format!(
                "Could not assign distribution settings because the naming convention differs: {}",
                reason
            )),
            None => Decision::Assign(self.decision.clone()),
        }
    }
}
