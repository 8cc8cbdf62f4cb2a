//! Raw tabular input as handed over by a sheet reader.
//!
//! Cells are kept as text; typing happens in the normalizer so that a
//! single bad cell drops one row instead of failing the whole sheet.

use super::DataError;

/// One column of a raw sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct RawColumn {
    pub label: String,
    pub cells: Vec<String>,
}

/// A rectangular sheet: every column has the same number of cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawDataset {
    columns: Vec<RawColumn>,
    n_rows: usize,
}

impl RawDataset {
    /// Build from a header row and data rows.
    ///
    /// Every row must have exactly one cell per header. A sheet with no
    /// headers or no rows is legal and normalizes to an empty table.
    pub fn from_rows<S: AsRef<str>>(headers: &[S], rows: &[Vec<S>]) -> Result<Self, DataError> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != headers.len() {
                return Err(DataError::MalformedInput(format!(
                    "row {} has {} cells, expected {} (one per header)",
                    i + 1,
                    row.len(),
                    headers.len()
                )));
            }
        }

        let columns = headers
            .iter()
            .enumerate()
            .map(|(c, label)| RawColumn {
                label: label.as_ref().to_string(),
                cells: rows.iter().map(|row| row[c].as_ref().to_string()).collect(),
            })
            .collect();

        Ok(Self {
            columns,
            n_rows: rows.len(),
        })
    }

    pub fn columns(&self) -> &[RawColumn] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Option<&RawColumn> {
        self.columns.get(index)
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.n_rows == 0
    }
}
