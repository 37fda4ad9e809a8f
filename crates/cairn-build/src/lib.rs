//! Cairn Build - Profile selection and catalog builds
//!
//! A build picks the profile variables for one resource type, marks the
//! groups whose load path matches as included, records the version in the
//! persisted build parameters and runs a [`BuildPipeline`].

mod params;
mod pipeline;
mod profile;
mod trigger;

pub use params::{BuildParameterStore, BuildParameters};
pub use pipeline::{BuildPipeline, BuildReport, CatalogPipeline};
pub use profile::{apply_profile, evaluate, resource_types, select_profile, BuildProfile};
pub use trigger::BuildTrigger;
