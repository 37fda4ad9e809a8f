//! Temporary project directories for tests

use crate::database::FsAssetDatabase;
use std::fs;
use std::path::PathBuf;

pub(crate) struct TempProject {
    pub root: PathBuf,
}

impl TempProject {
    /// Create a project containing the given (empty) asset files
    pub fn with_files(files: &[&str]) -> Self {
        let root = std::env::temp_dir().join(format!("cairn_test_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&root).unwrap();
        let project = Self { root };
        for file in files {
            project.write(file);
        }
        project
    }

    pub fn write(&self, asset_path: &str) {
        let full = self.root.join(asset_path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, b"asset").unwrap();
    }

    pub fn remove(&self, asset_path: &str) {
        fs::remove_file(self.root.join(asset_path)).unwrap();
    }

    pub fn database(&self) -> FsAssetDatabase {
        FsAssetDatabase::new(&self.root)
    }
}

impl Drop for TempProject {
    fn drop(&mut self) {
        fs::remove_dir_all(&self.root).ok();
    }
}
