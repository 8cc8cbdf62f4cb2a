//! Index manifest export (JSON).

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use indexlab_core::data::NormalizeReport;
use indexlab_core::index::{IndexOutcome, IndexSummary};
use indexlab_core::{DatasetHash, EntityId};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::IndexConfig;
use crate::pipeline::IndexRun;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexManifest {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub source: PathBuf,
    pub config: IndexConfig,
    pub base_date: Option<NaiveDate>,
    pub outcome: IndexOutcome,
    pub summary: Option<IndexSummary>,
    pub entities: Vec<EntityId>,
    pub dataset_hash: DatasetHash,
    pub report: NormalizeReport,
}

impl IndexManifest {
    pub fn from_run(run: &IndexRun) -> Self {
        Self {
            name: run.config.name.clone(),
            created_at: Utc::now(),
            source: run.source.clone(),
            config: run.config.clone(),
            base_date: run.result.base_date(),
            outcome: run.result.outcome,
            summary: run.summary(),
            entities: run.normalized.entities.clone(),
            dataset_hash: run.dataset_hash.clone(),
            report: run.normalized.report.clone(),
        }
    }
}

pub fn write_manifest(path: &Path, run: &IndexRun) -> Result<()> {
    let manifest = IndexManifest::from_run(run);
    let json =
        serde_json::to_string_pretty(&manifest).context("Failed to serialize index manifest")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write manifest to {}", path.display()))?;
    Ok(())
}
