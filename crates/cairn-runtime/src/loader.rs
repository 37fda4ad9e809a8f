//! Resource loader contract

use crate::catalog::CatalogLocator;
use async_trait::async_trait;
use cairn_core::{CairnError, Result};

/// Backend that resolves addresses to bytes and catalogs to locators
///
/// Every successful `load` holds one reference on the key until the matching
/// `release`.
#[async_trait]
pub trait ResourceLoader: Send + Sync + 'static {
    /// Load the bytes behind an address
    async fn load(&self, key: &str) -> Result<Vec<u8>>;

    /// Drop one reference taken by `load`
    fn release(&self, key: &str);

    /// Load a catalog and register its locator
    async fn load_catalog(&self, path: &str) -> Result<CatalogLocator>;
}

/// A value decoded from loaded bytes
pub trait Resource: Sized + Send + Sync + 'static {
    fn decode(key: &str, bytes: Vec<u8>) -> Result<Self>;
}

impl Resource for Vec<u8> {
    fn decode(_key: &str, bytes: Vec<u8>) -> Result<Self> {
        Ok(bytes)
    }
}

impl Resource for String {
    fn decode(key: &str, bytes: Vec<u8>) -> Result<Self> {
        String::from_utf8(bytes).map_err(|e| CairnError::LoadFailed {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }
}
