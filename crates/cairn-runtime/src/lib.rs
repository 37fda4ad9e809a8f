//! Cairn Runtime - Tracked resource loading
//!
//! Loads go through a [`ResourceLoader`]. The [`HandleManager`] keeps every
//! in-flight or completed load in one of two lists: auto-released handles are
//! dropped together by [`HandleManager::release_all`], retained handles
//! survive it and must be released one by one. A failed load is released and
//! untracked by the manager itself before the failure reaches any awaiter.
//!
//! [`CatalogSwitcher`] loads a newer catalog through the same loader and
//! records its locator id.

mod catalog;
mod file_loader;
mod handle;
mod loader;

pub use catalog::{CatalogLocator, CatalogSwitcher, LocatorRecord};
pub use file_loader::FileResourceLoader;
pub use handle::{HandleId, HandleManager, HandleStatus, LoadState, TrackedHandle};
pub use loader::{Resource, ResourceLoader};
