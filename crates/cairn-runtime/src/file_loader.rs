//! Resource loader over catalogs on the local filesystem

use crate::catalog::CatalogLocator;
use crate::loader::ResourceLoader;
use async_trait::async_trait;
use cairn_core::{CairnError, CatalogDocument, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

struct LoadedCatalog {
    locator: CatalogLocator,
    /// Directory entry paths are relative to
    base: PathBuf,
    document: CatalogDocument,
}

#[derive(Default)]
struct LoaderState {
    /// Oldest first
    catalogs: Vec<LoadedCatalog>,
    refs: HashMap<String, usize>,
}

/// Loads content listed in catalog documents written by the build pipeline
///
/// Addresses resolve through the most recently loaded catalog that lists them.
/// Reloading a catalog with a known locator id replaces the older copy.
#[derive(Default)]
pub struct FileResourceLoader {
    state: Mutex<LoaderState>,
}

impl FileResourceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    fn resolve(&self, key: &str) -> Option<PathBuf> {
        let state = self.state.lock();
        state
            .catalogs
            .iter()
            .rev()
            .find_map(|c| c.document.find(key).map(|entry| c.base.join(&entry.path)))
    }

    /// Outstanding `load` references on an address
    pub fn ref_count(&self, key: &str) -> usize {
        self.state.lock().refs.get(key).copied().unwrap_or(0)
    }

    /// Loaded catalogs, oldest first
    pub fn locators(&self) -> Vec<CatalogLocator> {
        self.state
            .lock()
            .catalogs
            .iter()
            .map(|c| c.locator.clone())
            .collect()
    }
}

#[async_trait]
impl ResourceLoader for FileResourceLoader {
    async fn load(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.resolve(key).ok_or_else(|| CairnError::LoadFailed {
            key: key.to_string(),
            reason: "address is not listed in any loaded catalog".to_string(),
        })?;

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| CairnError::LoadFailed {
                key: key.to_string(),
                reason: format!("{}: {}", path.display(), e),
            })?;

        *self.state.lock().refs.entry(key.to_string()).or_default() += 1;
        debug!(key, path = %path.display(), bytes = bytes.len(), "loaded");
        Ok(bytes)
    }

    fn release(&self, key: &str) {
        let mut state = self.state.lock();
        match state.refs.get_mut(key) {
            Some(count) if *count > 1 => *count -= 1,
            Some(_) => {
                state.refs.remove(key);
            }
            None => debug!(key, "release of an unreferenced address"),
        }
    }

    async fn load_catalog(&self, path: &str) -> Result<CatalogLocator> {
        let failed = |reason: String| CairnError::CatalogFailed {
            path: path.to_string(),
            reason,
        };

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| failed(e.to_string()))?;
        let document = CatalogDocument::from_json(&content).map_err(|e| failed(e.to_string()))?;

        let locator = CatalogLocator {
            id: document.locator_id.clone(),
            path: path.to_string(),
        };
        let version = document.version_code.clone();
        let base = Path::new(path)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let mut state = self.state.lock();
        state.catalogs.retain(|c| c.locator.id != locator.id);
        state.catalogs.push(LoadedCatalog {
            locator: locator.clone(),
            base,
            document,
        });
        info!(locator = %locator.id, version = %version, "catalog loaded");

        Ok(locator)
    }
}
