//! Cairn Core - Foundational types for the Cairn asset distribution tools
//!
//! This crate provides the types that all other Cairn crates depend on:
//! - `ContentHash` - SHA-256 based asset GUIDs
//! - Asset path helpers (basename addressing, directory and category extraction)
//! - `CatalogDocument` - the catalog format shared by the build and runtime sides
//! - Error types and Result alias

mod catalog;
mod error;
mod hash;
pub mod path;

pub use catalog::{CatalogDocument, CatalogEntry};
pub use error::{CairnError, Result};
pub use hash::ContentHash;
