//! Asset path helpers
//!
//! Asset paths are project-relative and `/`-separated (e.g. `Assets/Art/sword.png`).
//! Addresses are always derived from the file name, never from the full path.

use crate::{CairnError, Result};

/// Replace Windows separators with `/`
pub fn normalize(path: &str) -> String {
    path.replace('\\', "/")
}

/// The file name part of an asset path, optionally keeping its extension
pub fn asset_name(asset_path: &str, include_extension: bool) -> Result<String> {
    let path = normalize(asset_path);
    let index = path.rfind('/').ok_or_else(|| missing_separator(&path))?;
    let name = &path[index + 1..];

    if include_extension {
        return Ok(name.to_string());
    }

    match name.rfind('.') {
        Some(dot) if dot > 0 => Ok(name[..dot].to_string()),
        _ => Ok(name.to_string()),
    }
}

/// The directory part of an asset path (everything before the last `/`)
pub fn asset_directory(asset_path: &str) -> Result<String> {
    let path = normalize(asset_path);
    let index = path.rfind('/').ok_or_else(|| missing_separator(&path))?;
    Ok(path[..index].to_string())
}

/// The first directory below `root` that contains the asset
///
/// `asset_category("Assets/Game/Weapons/sword.png", "Assets/Game/")` is `Weapons`.
/// An asset placed directly in `root` yields its own file name.
pub fn asset_category(asset_path: &str, root: &str) -> Result<String> {
    let path = normalize(asset_path);
    let root = normalize(root);
    let start = path.find(&root).ok_or_else(|| CairnError::InvalidAssetPath {
        path: path.clone(),
        reason: format!("asset not placed in \"{}\"", root),
    })?;

    let rest = &path[start + root.len()..];
    let category = match rest.find('/') {
        Some(end) => &rest[..end],
        None => rest,
    };
    Ok(category.to_string())
}

/// The address assigned to an asset: its base name, optionally prefixed
pub fn address_for(asset_path: &str, prefix: Option<&str>) -> Result<String> {
    let name = asset_name(asset_path, false)?;
    Ok(match prefix {
        Some(prefix) => format!("{}{}", prefix, name),
        None => name,
    })
}

fn missing_separator(path: &str) -> CairnError {
    CairnError::InvalidAssetPath {
        path: path.to_string(),
        reason: "path does not contain \"/\"".to_string(),
    }
}
