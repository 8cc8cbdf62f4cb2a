//! Export orchestrator.

use anyhow::{bail, Result};
use std::path::Path;

use crate::pipeline::IndexRun;
use crate::reporting::artifacts::{ArtifactManager, ArtifactPaths};

/// Write all artifacts for a run. Runs without index values are refused.
pub fn export_run(output_dir: impl AsRef<Path>, run: &IndexRun) -> Result<ArtifactPaths> {
    if let Some(diagnostic) = run.diagnostic() {
        bail!("nothing to export: {diagnostic}");
    }
    let manager = ArtifactManager::new(output_dir)?;
    manager.save_index(run)
}
