//! Index pipeline: sheet loader → normalizer → compounder.
//!
//! Two entry points:
//! - `run_index()`: loads the configured sheet from disk, then runs. Used by the CLI.
//! - `run_from_raw()`: takes an already loaded raw dataset. Used by tests and
//!   by callers that read sheets themselves.
//!
//! Structural failures (missing file, ragged rows, duplicate labels, bad
//! config) are errors. Data-quality outcomes are not: they come back as a
//! [`PipelineStatus`] so the caller can print a diagnostic and skip reporting.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use indexlab_core::data::{normalize_with, DataError, Normalized, RawDataset};
use indexlab_core::index::{compute_index, IndexOutcome, IndexResult, IndexSeries, IndexSummary};
use indexlab_core::DatasetHash;

use crate::config::{ConfigError, IndexConfig};
use crate::data_loader::load_sheet;

/// Errors from the pipeline.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
}

/// Where the pipeline stopped producing data, if it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    /// Index computed; reporting can proceed.
    Ready,
    /// Nothing survived normalization.
    NoDataLoaded,
    /// Dates were loaded but no entity ever reported a price.
    NoActiveEntities,
}

/// Complete result of one index run.
#[derive(Debug, Clone)]
pub struct IndexRun {
    pub config: IndexConfig,
    /// Sheet file the data came from.
    pub source: PathBuf,
    pub normalized: Normalized,
    pub result: IndexResult,
    pub dataset_hash: DatasetHash,
    pub status: PipelineStatus,
}

impl IndexRun {
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Month-end samples of the index.
    pub fn monthly(&self) -> IndexSeries {
        self.result.index.resample_month_end()
    }

    pub fn summary(&self) -> Option<IndexSummary> {
        self.result.summary()
    }

    /// Stage-specific explanation when the run produced no index values.
    pub fn diagnostic(&self) -> Option<String> {
        match self.status {
            PipelineStatus::Ready => None,
            PipelineStatus::NoDataLoaded => Some(format!(
                "{}: no data loaded from {}",
                self.config.name,
                self.source.display()
            )),
            PipelineStatus::NoActiveEntities => Some(format!(
                "{}: index computation produced no values",
                self.config.name
            )),
        }
    }
}

/// Load the configured sheet and build the index.
pub fn run_index(config: &IndexConfig) -> Result<IndexRun, RunError> {
    config.validate()?;
    let (sheet, raw) = load_sheet(&config.input, &config.sheet)?;
    info!(index = %config.name, sheet = %sheet.name, "loaded sheet");
    run_from_raw(config, &raw, sheet.path)
}

/// Build the index from an already loaded sheet.
pub fn run_from_raw(
    config: &IndexConfig,
    raw: &RawDataset,
    source: PathBuf,
) -> Result<IndexRun, RunError> {
    config.validate()?;

    let normalized = normalize_with(raw, &config.table_shape(), config.date_order)?;
    for note in normalized.report.notes() {
        warn!(index = %config.name, "{note}");
    }

    let result = compute_index(&normalized.table, config.base_value);
    let dataset_hash = normalized.table.dataset_hash();

    let status = if normalized.is_empty() {
        PipelineStatus::NoDataLoaded
    } else {
        match result.outcome {
            IndexOutcome::Computed { .. } => PipelineStatus::Ready,
            IndexOutcome::NoActiveEntities => PipelineStatus::NoActiveEntities,
            IndexOutcome::Empty => PipelineStatus::NoDataLoaded,
        }
    };

    match status {
        PipelineStatus::Ready => info!(
            index = %config.name,
            entities = normalized.entities.len(),
            dates = normalized.table.n_dates(),
            base_date = ?result.base_date(),
            hash = %dataset_hash,
            "index computed"
        ),
        other => warn!(index = %config.name, status = ?other, "index has no values"),
    }

    Ok(IndexRun {
        config: config.clone(),
        source,
        normalized,
        result,
        dataset_hash,
        status,
    })
}
