//! Error types for Cairn

use thiserror::Error;

/// The main error type for Cairn operations
#[derive(Debug, Error)]
pub enum CairnError {
    #[error("There is no group with name \"{0}\"")]
    GroupNotFound(String),

    #[error("There is no group with name keyword \"{0}\"")]
    GroupKeywordNotFound(String),

    #[error("No group template is registered; cannot create group \"{0}\"")]
    NoGroupTemplate(String),

    #[error("A configurator is already registered for path \"{0}\"")]
    DuplicateConfigurator(String),

    #[error("Invalid asset path \"{path}\": {reason}")]
    InvalidAssetPath { path: String, reason: String },

    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    #[error("Failed to load \"{key}\": {reason}")]
    LoadFailed { key: String, reason: String },

    #[error("Failed to load catalog \"{path}\": {reason}")]
    CatalogFailed { path: String, reason: String },

    #[error("Build error: {0}")]
    BuildError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),

    #[error("JSON error: {0}")]
    JsonError(String),
}

/// Result type alias for Cairn operations
pub type Result<T> = std::result::Result<T, CairnError>;

impl From<toml::de::Error> for CairnError {
    fn from(err: toml::de::Error) -> Self {
        CairnError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for CairnError {
    fn from(err: toml::ser::Error) -> Self {
        CairnError::TomlSerError(err.to_string())
    }
}

impl From<serde_json::Error> for CairnError {
    fn from(err: serde_json::Error) -> Self {
        CairnError::JsonError(err.to_string())
    }
}
