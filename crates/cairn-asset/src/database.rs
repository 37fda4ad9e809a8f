//! Asset database access

use crate::types::{AssetInfo, AssetType};
use cairn_core::{path, ContentHash, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Read access to the project's assets
///
/// Paths are project-relative and `/`-separated.
pub trait AssetDatabase {
    /// Load the asset at `asset_path`, or `None` if nothing readable is there
    fn load(&self, asset_path: &str) -> Option<AssetInfo>;

    /// Every file below `root`, recursively, as asset paths
    fn files_under(&self, root: &str) -> Result<Vec<String>>;

    /// The stable GUID of an asset path
    fn guid(&self, asset_path: &str) -> ContentHash {
        ContentHash::for_asset_path(asset_path)
    }
}

/// Asset database over a project directory on disk
#[derive(Debug, Clone)]
pub struct FsAssetDatabase {
    root: PathBuf,
}

impl FsAssetDatabase {
    /// Create a database rooted at the project directory
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// The project directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of an asset path
    pub fn full_path(&self, asset_path: &str) -> PathBuf {
        self.root.join(path::normalize(asset_path))
    }

    fn to_asset_path(&self, full: &Path) -> Option<String> {
        let relative = full.strip_prefix(&self.root).ok()?;
        Some(path::normalize(&relative.to_string_lossy()))
    }
}

impl AssetDatabase for FsAssetDatabase {
    fn load(&self, asset_path: &str) -> Option<AssetInfo> {
        let normalized = path::normalize(asset_path);
        let metadata = fs::metadata(self.full_path(&normalized)).ok()?;

        let asset_type = if metadata.is_dir() {
            AssetType::Folder
        } else {
            Path::new(&normalized)
                .extension()
                .and_then(|e| e.to_str())
                .map(AssetType::from_extension)
                .unwrap_or(AssetType::Untyped)
        };

        Some(AssetInfo {
            guid: self.guid(&normalized),
            path: normalized,
            asset_type,
        })
    }

    fn files_under(&self, root: &str) -> Result<Vec<String>> {
        let dir = self.full_path(root);
        if !dir.is_dir() {
            debug!(root, "directory does not exist, nothing to scan");
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&dir).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(asset_path) = self.to_asset_path(entry.path()) {
                files.push(asset_path);
            }
        }

        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TempProject;

    #[test]
    fn test_load_typed_file() {
        let project = TempProject::with_files(&["Assets/Art/sword.png"]);
        let db = project.database();

        let info = db.load("Assets/Art/sword.png").unwrap();
        assert_eq!(info.asset_type, AssetType::Texture);
        assert_eq!(info.path, "Assets/Art/sword.png");
        assert_eq!(info.guid, ContentHash::for_asset_path("Assets/Art/sword.png"));
    }

    #[test]
    fn test_load_folder_and_missing() {
        let project = TempProject::with_files(&["Assets/Art/sword.png"]);
        let db = project.database();

        assert_eq!(db.load("Assets/Art").unwrap().asset_type, AssetType::Folder);
        assert!(db.load("Assets/Art/missing.png").is_none());
    }

    #[test]
    fn test_files_under_is_recursive_and_sorted() {
        let project = TempProject::with_files(&[
            "Assets/Art/b.png",
            "Assets/Art/a.png",
            "Assets/Art/Deep/c.png",
            "Assets/Other/x.png",
        ]);
        let db = project.database();

        let files = db.files_under("Assets/Art").unwrap();
        assert_eq!(
            files,
            vec!["Assets/Art/Deep/c.png", "Assets/Art/a.png", "Assets/Art/b.png"]
        );
    }

    #[test]
    fn test_files_under_missing_directory() {
        let project = TempProject::with_files(&[]);
        assert!(project.database().files_under("Assets/Nope").unwrap().is_empty());
    }
}
