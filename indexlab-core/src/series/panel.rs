//! Date × entity panel on a common timeline.
//!
//! Given per-entity observations, align them to the union of their dates.
//! Cells an entity did not report are `None`; nothing is filled at this stage.

use crate::data::DataError;
use crate::domain::{DatasetHash, EntityId};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Rectangular table of optional values keyed by date (rows) and entity (columns).
///
/// Invariants: `dates` strictly ascending; entity ids unique; every column
/// has exactly `dates.len()` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    dates: Vec<NaiveDate>,
    entities: Vec<EntityId>,
    columns: Vec<Vec<Option<f64>>>,
}

/// Canonical table produced by the normalizer.
pub type PriceTable = Panel;
/// Price table after per-entity forward fill.
pub type FilledPriceTable = Panel;
/// Simple daily returns per entity.
pub type DailyReturnTable = Panel;

impl Panel {
    /// The explicitly-empty table: no dates, no entities.
    pub fn empty() -> Self {
        Self {
            dates: Vec::new(),
            entities: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Build a panel from aligned columns, checking every invariant.
    pub fn new(
        dates: Vec<NaiveDate>,
        entities: Vec<EntityId>,
        columns: Vec<Vec<Option<f64>>>,
    ) -> Result<Self, DataError> {
        if let Some(w) = dates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(DataError::MalformedInput(format!(
                "dates must be strictly ascending ({} followed by {})",
                w[0], w[1]
            )));
        }
        if entities.len() != columns.len() {
            return Err(DataError::MalformedInput(format!(
                "{} entities but {} columns",
                entities.len(),
                columns.len()
            )));
        }
        let mut seen = HashSet::new();
        for entity in &entities {
            if !seen.insert(entity) {
                return Err(DataError::DuplicateEntity {
                    label: entity.to_string(),
                });
            }
        }
        for (entity, column) in entities.iter().zip(&columns) {
            if column.len() != dates.len() {
                return Err(DataError::MalformedInput(format!(
                    "column '{entity}' has {} cells for {} dates",
                    column.len(),
                    dates.len()
                )));
            }
        }
        Ok(Self {
            dates,
            entities,
            columns,
        })
    }

    /// Outer-join per-entity observations onto the union of their dates.
    ///
    /// Entity order is preserved. Callers guarantee unique ids.
    pub fn outer_join(observations: Vec<(EntityId, BTreeMap<NaiveDate, f64>)>) -> Self {
        let all_dates: BTreeSet<NaiveDate> = observations
            .iter()
            .flat_map(|(_, points)| points.keys().copied())
            .collect();
        let dates: Vec<NaiveDate> = all_dates.into_iter().collect();

        let mut entities = Vec::with_capacity(observations.len());
        let mut columns = Vec::with_capacity(observations.len());
        for (entity, points) in observations {
            let column = dates.iter().map(|d| points.get(d).copied()).collect();
            entities.push(entity);
            columns.push(column);
        }

        Self {
            dates,
            entities,
            columns,
        }
    }

    /// Same calendar and entities, new cells. Column shapes are the caller's contract.
    pub(crate) fn with_columns(&self, columns: Vec<Vec<Option<f64>>>) -> Self {
        debug_assert_eq!(columns.len(), self.entities.len());
        debug_assert!(columns.iter().all(|c| c.len() == self.dates.len()));
        Self {
            dates: self.dates.clone(),
            entities: self.entities.clone(),
            columns,
        }
    }

    /// True when there is nothing to compute on: no dates or no entities.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() || self.entities.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    pub fn n_dates(&self) -> usize {
        self.dates.len()
    }

    pub fn n_entities(&self) -> usize {
        self.entities.len()
    }

    /// Row position of `date`, if it is on the calendar.
    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }

    pub fn column(&self, entity: &EntityId) -> Option<&[Option<f64>]> {
        self.entities
            .iter()
            .position(|e| e == entity)
            .map(|i| self.columns[i].as_slice())
    }

    /// Entities paired with their columns, in entity order.
    pub fn columns(&self) -> impl Iterator<Item = (&EntityId, &[Option<f64>])> {
        self.entities
            .iter()
            .zip(self.columns.iter().map(|c| c.as_slice()))
    }

    /// Cell value for `entity` on `date`.
    pub fn get(&self, entity: &EntityId, date: NaiveDate) -> Option<f64> {
        let row = self.position(date)?;
        self.column(entity)?[row]
    }

    /// Cells of row `row` in entity order.
    pub fn row(&self, row: usize) -> Vec<Option<f64>> {
        self.columns.iter().map(|c| c[row]).collect()
    }

    /// First date on which `entity` has a value.
    pub fn first_recorded(&self, entity: &EntityId) -> Option<NaiveDate> {
        let column = self.column(entity)?;
        column
            .iter()
            .position(|v| v.is_some())
            .map(|i| self.dates[i])
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> Self {
        let n = n.min(self.dates.len());
        self.slice_rows(0, n)
    }

    /// Last `n` rows.
    pub fn tail(&self, n: usize) -> Self {
        let start = self.dates.len().saturating_sub(n);
        self.slice_rows(start, self.dates.len())
    }

    fn slice_rows(&self, start: usize, end: usize) -> Self {
        Self {
            dates: self.dates[start..end].to_vec(),
            entities: self.entities.clone(),
            columns: self.columns.iter().map(|c| c[start..end].to_vec()).collect(),
        }
    }

    /// Deterministic BLAKE3 hash over entity labels, dates and cell values.
    ///
    /// Absent cells hash differently from any float, so a gap and a zero
    /// never collide.
    pub fn dataset_hash(&self) -> DatasetHash {
        let mut hasher = blake3::Hasher::new();
        for date in &self.dates {
            hasher.update(date.to_string().as_bytes());
        }
        for (entity, column) in self.columns() {
            hasher.update(entity.as_str().as_bytes());
            hasher.update(&[0u8]);
            for cell in column {
                match cell {
                    Some(v) => {
                        hasher.update(&[1u8]);
                        hasher.update(&v.to_le_bytes());
                    }
                    None => {
                        hasher.update(&[0u8]);
                    }
                }
            }
        }
        DatasetHash(hasher.finalize().to_hex().to_string())
    }
}

impl Default for Panel {
    fn default() -> Self {
        Self::empty()
    }
}
