//! Load addresses through a built catalog

use anyhow::{Context, Result};
use cairn_runtime::{CatalogSwitcher, FileResourceLoader, HandleManager, LocatorRecord};
use std::sync::Arc;

pub async fn run(catalog: &str, addresses: &[String]) -> Result<()> {
    let loader = Arc::new(FileResourceLoader::new());
    let mut record = LocatorRecord::default();
    CatalogSwitcher::new(loader.clone())
        .switch_catalog(&mut record, catalog)
        .await
        .with_context(|| format!("Failed to load catalog {}", catalog))?;

    let manager = HandleManager::new(loader);
    let handles: Vec<_> = addresses
        .iter()
        .map(|address| manager.load::<Vec<u8>>(address, false))
        .collect();

    let mut failed = 0;
    for handle in &handles {
        match handle.completion().await {
            Ok(bytes) => println!("{}: {} bytes", handle.key(), bytes.len()),
            Err(e) => {
                failed += 1;
                println!("{}: {}", handle.key(), e);
            }
        }
    }

    let released = manager.release_all();
    println!("Released {} handles", released);

    if failed > 0 {
        anyhow::bail!("{} of {} addresses failed to load", failed, handles.len());
    }
    Ok(())
}
