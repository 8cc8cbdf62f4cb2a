//! Reporting: console previews and artifact export.

pub mod artifacts;
pub mod export;
pub mod preview;

pub use artifacts::{ArtifactManager, ArtifactPaths, IndexManifest};
pub use export::export_run;
