//! Asset type definitions

use cairn_core::ContentHash;
use serde::{Deserialize, Serialize};

/// Types of assets the asset database recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Mesh,
    Texture,
    Material,
    Audio,
    Script,
    Scene,
    Prefab,
    Data,
    /// A directory
    Folder,
    /// A file the database can read but assigns no type to
    Untyped,
}

impl AssetType {
    /// Classify a file by its extension (case-insensitive)
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "glb" | "gltf" | "obj" | "fbx" => AssetType::Mesh,
            "png" | "jpg" | "jpeg" | "tga" | "psd" | "bmp" | "exr" => AssetType::Texture,
            "mat" => AssetType::Material,
            "wav" | "ogg" | "mp3" | "flac" => AssetType::Audio,
            "rhai" | "lua" | "cs" => AssetType::Script,
            "scene" => AssetType::Scene,
            "prefab" => AssetType::Prefab,
            "toml" | "json" | "asset" | "txt" => AssetType::Data,
            _ => AssetType::Untyped,
        }
    }

    /// Folders and untyped files never receive distribution settings
    pub fn is_supported(&self) -> bool {
        !matches!(self, AssetType::Folder | AssetType::Untyped)
    }
}

/// An asset as seen by the asset database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetInfo {
    /// Normalized project-relative path
    pub path: String,
    pub asset_type: AssetType,
    pub guid: ContentHash,
}
