//! Artifact manager for persisting index outputs.

mod manifest;
mod series;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::pipeline::IndexRun;

pub use manifest::IndexManifest;
pub use series::{write_series_csv, write_series_parquet};

/// Artifact paths returned after export.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub dir: PathBuf,
    pub manifest: PathBuf,
    pub index_csv: PathBuf,
    pub index_parquet: PathBuf,
    pub monthly_csv: PathBuf,
}

/// Manages writing all artifacts for a run, one subdirectory per index.
#[derive(Debug, Clone)]
pub struct ArtifactManager {
    output_dir: PathBuf,
}

impl ArtifactManager {
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir)
            .context("Failed to create artifact output directory")?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Save the index, its month-end samples and the manifest.
    pub fn save_index(&self, run: &IndexRun) -> Result<ArtifactPaths> {
        let dir = self.output_dir.join(run.config.slug());
        std::fs::create_dir_all(&dir).context("Failed to create index artifact directory")?;

        let index_csv = dir.join("index.csv");
        let index_parquet = dir.join("index.parquet");
        write_series_csv(&index_csv, "index_value", &run.result.index)?;
        write_series_parquet(&index_parquet, "index_value", &run.result.index)?;

        let monthly_csv = dir.join("monthly.csv");
        write_series_csv(&monthly_csv, "index_value", &run.monthly())?;

        let manifest_path = dir.join("manifest.json");
        manifest::write_manifest(&manifest_path, run)?;

        info!(index = %run.config.name, dir = %dir.display(), "artifacts written");
        Ok(ArtifactPaths {
            dir,
            manifest: manifest_path,
            index_csv,
            index_parquet,
            monthly_csv,
        })
    }
}
