//! Structured error types for data operations.
//!
//! Only structural problems are errors. Unparseable cells and entities
//! without usable rows are routine and surface through
//! [`NormalizeReport`](super::normalize::NormalizeReport) instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("data unavailable at {}: {reason}", path.display())]
    DataUnavailable { path: PathBuf, reason: String },

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("duplicate entity label '{label}' (columns must be uniquely named)")]
    DuplicateEntity { label: String },
}

impl DataError {
    pub fn unavailable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
