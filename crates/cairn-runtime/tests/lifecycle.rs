//! Handle lifecycle and catalog switching over real catalog files

use cairn_core::{CatalogDocument, CatalogEntry};
use cairn_runtime::{
    CatalogSwitcher, FileResourceLoader, HandleManager, HandleStatus, LocatorRecord,
};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

struct Cdn {
    dir: PathBuf,
}

impl Cdn {
    fn new() -> Self {
        let dir = std::env::temp_dir().join(format!("cairn_it_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        Self { dir }
    }

    fn publish(&self, version: &str, items: &[(&str, &str)]) -> String {
        let root = self.dir.join(version);
        fs::create_dir_all(root.join("content")).unwrap();
        let entries = items
            .iter()
            .map(|(address, content)| {
                let path = format!("content/{}.txt", address);
                fs::write(root.join(&path), content).unwrap();
                CatalogEntry {
                    address: address.to_string(),
                    path,
                    group: "Remote".to_string(),
                    labels: vec!["text".to_string()],
                }
            })
            .collect();

        let catalog = root.join(format!("catalog_{}.json", version));
        CatalogDocument {
            locator_id: format!("cat-{}", version),
            version_code: version.to_string(),
            entries,
        }
        .save(&catalog)
        .unwrap();
        catalog.to_string_lossy().into_owned()
    }
}

impl Drop for Cdn {
    fn drop(&mut self) {
        fs::remove_dir_all(&self.dir).ok();
    }
}

#[tokio::test]
async fn switch_then_load_through_manager() {
    let cdn = Cdn::new();
    let v1 = cdn.publish("v1", &[("banner", "spring sale")]);
    let v2 = cdn.publish("v2", &[("banner", "summer sale")]);

    let loader = Arc::new(FileResourceLoader::new());
    let switcher = CatalogSwitcher::new(loader.clone());
    let manager = HandleManager::new(loader.clone());

    let mut record = LocatorRecord::default();
    switcher.switch_catalog(&mut record, &v1).await.unwrap();
    assert_eq!(record.locator_id.as_deref(), Some("cat-v1"));

    let first = manager.load::<String>("banner", false);
    assert_eq!(*first.completion().await.unwrap(), "spring sale");

    switcher.switch_catalog(&mut record, &v2).await.unwrap();
    assert_eq!(record.locator_id.as_deref(), Some("cat-v2"));

    let second = manager.load::<String>("banner", true);
    assert_eq!(*second.completion().await.unwrap(), "summer sale");
    assert_eq!(loader.ref_count("banner"), 2);

    manager.release_all();
    assert_eq!(manager.auto_count(), 0);
    assert_eq!(manager.retained_count(), 1);
    assert_eq!(loader.ref_count("banner"), 1);

    manager.release(&second);
    assert_eq!(loader.ref_count("banner"), 0);
}

#[tokio::test]
async fn failed_switch_keeps_record() {
    let cdn = Cdn::new();
    let v1 = cdn.publish("v1", &[]);
    let loader = Arc::new(FileResourceLoader::new());
    let switcher = CatalogSwitcher::new(loader.clone());

    let mut record = LocatorRecord::new("v1", "cat-v1");
    switcher.switch_catalog(&mut record, &v1).await.unwrap();

    let missing = cdn.dir.join("v2/catalog_v2.json");
    assert!(switcher
        .switch_catalog(&mut record, &missing.to_string_lossy())
        .await
        .is_err());
    assert_eq!(record, LocatorRecord::new("v1", "cat-v1"));
}

#[tokio::test]
async fn missing_address_fails_and_is_untracked() {
    let loader = Arc::new(FileResourceLoader::new());
    let manager = HandleManager::new(loader);

    let handle = manager.load::<Vec<u8>>("nowhere", false);
    assert!(handle.completion().await.is_err());
    assert_eq!(handle.status(), HandleStatus::Failed);
    assert_eq!(manager.auto_count(), 0);
    assert!(!manager.release(&handle));
}
