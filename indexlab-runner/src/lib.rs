//! IndexLab Runner: configuration, sheet loading, pipeline, reporting.
//!
//! This crate builds on `indexlab-core` to provide:
//! - TOML index configuration with validation
//! - Workbook/sheet loading from CSV files or directories of CSV sheets
//! - The load → normalize → compound pipeline with stage-specific diagnostics
//! - Console previews and CSV/Parquet/JSON artifact export

pub mod config;
pub mod data_loader;
pub mod pipeline;
pub mod reporting;

pub use config::{ConfigError, IndexConfig, RunConfig, ShapeKind, SheetSelector};
pub use data_loader::{list_sheets, load_sheet, read_csv_sheet, select_sheet, Sheet};
pub use pipeline::{run_from_raw, run_index, IndexRun, PipelineStatus, RunError};
pub use reporting::{export_run, ArtifactManager, ArtifactPaths, IndexManifest};
