//! IndexLab Core: price table normalization and equal-weighted index construction.
//!
//! This crate contains the index-construction algorithm:
//! - Raw sheet intake and cell parsing (paired date/price columns or a single date index)
//! - Canonical date × entity price table with explicit absent cells
//! - Per-entity forward fill that never back-fills before listing
//! - Daily and equal-weighted composite returns over listed entities only
//! - Compounding into an index rebased to a base value on the first active date
//! - Sparse date series with head/tail slicing and month-end resampling

pub mod data;
pub mod domain;
pub mod index;
pub mod series;

pub use data::{normalize, DataError, Normalized, RawDataset, TableShape};
pub use domain::{DatasetHash, EntityId};
pub use index::{compute_index, IndexOutcome, IndexResult, IndexSeries};
pub use series::{DateSeries, Panel, PriceTable};
