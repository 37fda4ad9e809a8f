//! Catalog documents mapping addresses to physical asset locations
//!
//! Written by the build pipeline, read by the runtime loader.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One addressable entry in a built catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub address: String,
    /// Location of the content, relative to the catalog file
    pub path: String,
    pub group: String,
    #[serde(default)]
    pub labels: Vec<String>,
}

/// A built catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDocument {
    pub locator_id: String,
    pub version_code: String,
    #[serde(default)]
    pub entries: Vec<CatalogEntry>,
}

impl CatalogDocument {
    /// Find an entry by address
    pub fn find(&self, address: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.address == address)
    }

    /// Load a catalog from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a catalog from JSON text
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Save the catalog as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
