//! Excluded path roots

use cairn_core::path;

/// Rejects asset paths that contain any excluded root
///
/// The list is fixed once constructed.
#[derive(Debug, Clone, Default)]
pub struct ExclusionFilter {
    roots: Vec<String>,
}

impl ExclusionFilter {
    pub fn new<I, S>(roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            roots: roots
                .into_iter()
                .map(|r| path::normalize(r.as_ref()))
                .filter(|r| !r.is_empty())
                .collect(),
        }
    }

    /// Whether the path lies under an excluded root
    pub fn is_excluded(&self, asset_path: &str) -> bool {
        let normalized = path::normalize(asset_path);
        self.roots.iter().any(|root| normalized.contains(root.as_str()))
    }

    pub fn roots(&self) -> &[String] {
        &self.roots
    }
}
