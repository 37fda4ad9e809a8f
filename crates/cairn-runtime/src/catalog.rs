//! Catalog locators and version switching

use crate::loader::ResourceLoader;
use cairn_core::{CairnError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Identity of a loaded catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogLocator {
    pub id: String,
    pub path: String,
}

/// The catalog version a client is currently resolving against
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorRecord {
    #[serde(default)]
    pub version_code: String,
    #[serde(default)]
    pub locator_id: Option<String>,
}

impl LocatorRecord {
    pub fn new(version_code: impl Into<String>, locator_id: impl Into<String>) -> Self {
        Self {
            version_code: version_code.into(),
            locator_id: Some(locator_id.into()),
        }
    }
}

/// Loads newer catalogs and supersedes the recorded locator
#[derive(Clone)]
pub struct CatalogSwitcher {
    loader: Arc<dyn ResourceLoader>,
}

impl CatalogSwitcher {
    pub fn new(loader: Arc<dyn ResourceLoader>) -> Self {
        Self { loader }
    }

    /// Load the catalog at `new_path` and record its locator id
    ///
    /// On failure the record is left exactly as it was.
    pub async fn switch_catalog(&self, record: &mut LocatorRecord, new_path: &str) -> Result<String> {
        match self.loader.load_catalog(new_path).await {
            Ok(locator) => {
                info!(
                    path = new_path,
                    previous = record.locator_id.as_deref().unwrap_or("none"),
                    locator = %locator.id,
                    "switched remote catalog"
                );
                record.locator_id = Some(locator.id.clone());
                Ok(locator.id)
            }
            Err(e) => {
                warn!(path = new_path, error = %e, "catalog switch failed");
                Err(match e {
                    CairnError::CatalogFailed { .. } => e,
                    other => CairnError::CatalogFailed {
                        path: new_path.to_string(),
                        reason: other.to_string(),
                    },
                })
            }
        }
    }
}
