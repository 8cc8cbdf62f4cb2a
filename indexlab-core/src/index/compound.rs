//! Index compounding.
//!
//! Turns a canonical price table into an equal-weighted index rebased to
//! `base_value` on the first date any entity has a price. The base-date
//! composite return is forced to zero *before* compounding, so the index
//! always starts exactly at `base_value`.

use super::fill::forward_fill;
use super::returns::{composite_returns, daily_returns};
use crate::series::{DailyReturnTable, DateSeries, FilledPriceTable, Panel, PriceTable};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Index level per date. Absent before the base date.
pub type IndexSeries = DateSeries<f64>;
/// Number of listed entities per date.
pub type ActiveCount = DateSeries<usize>;

/// How an index computation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IndexOutcome {
    /// The price table was empty; every output is empty.
    Empty,
    /// The table has dates but no entity ever reported a price.
    NoActiveEntities,
    /// Index computed from `base_date` onward.
    Computed { base_date: NaiveDate },
}

/// Everything the compounder derives from a price table.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexResult {
    pub index: IndexSeries,
    /// Equal-weighted daily return; zero on the base date.
    pub composite_returns: DateSeries<f64>,
    pub daily_returns: DailyReturnTable,
    pub filled: FilledPriceTable,
    pub active_count: ActiveCount,
    pub base_value: f64,
    pub outcome: IndexOutcome,
}

/// Headline numbers for reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSummary {
    pub base_date: NaiveDate,
    pub base_value: f64,
    pub last_date: NaiveDate,
    pub last_value: f64,
    /// `last_value / base_value - 1`.
    pub total_return: f64,
    pub entity_count: usize,
    pub peak_active: usize,
    /// Dates with an index value.
    pub observations: usize,
}

impl IndexResult {
    /// The sentinel returned for an empty price table.
    pub fn empty(base_value: f64) -> Self {
        Self {
            index: DateSeries::new(),
            composite_returns: DateSeries::new(),
            daily_returns: Panel::empty(),
            filled: Panel::empty(),
            active_count: DateSeries::new(),
            base_value,
            outcome: IndexOutcome::Empty,
        }
    }

    pub fn base_date(&self) -> Option<NaiveDate> {
        match self.outcome {
            IndexOutcome::Computed { base_date } => Some(base_date),
            _ => None,
        }
    }

    /// True when the index has at least one value.
    pub fn has_values(&self) -> bool {
        self.index.has_values()
    }

    pub fn summary(&self) -> Option<IndexSummary> {
        let base_date = self.base_date()?;
        let (last_date, last_value) = self.index.last_present()?;
        Some(IndexSummary {
            base_date,
            base_value: self.base_value,
            last_date,
            last_value,
            total_return: last_value / self.base_value - 1.0,
            entity_count: self.filled.n_entities(),
            peak_active: self.active_count.present().map(|(_, n)| n).max().unwrap_or(0),
            observations: self.index.present_count(),
        })
    }
}

/// Per row, the number of entities with a raw price on or before that row.
pub fn active_counts(table: &PriceTable) -> Vec<usize> {
    let first_rows: Vec<usize> = table
        .columns()
        .filter_map(|(_, column)| column.iter().position(|v| v.is_some()))
        .collect();
    (0..table.n_dates())
        .map(|row| first_rows.iter().filter(|&&first| first <= row).count())
        .collect()
}

/// Compute the equal-weighted index for `table`, rebased to `base_value`.
///
/// Never fails: an empty table yields [`IndexResult::empty`], a table where
/// no entity ever reports yields an all-absent index with
/// [`IndexOutcome::NoActiveEntities`]. `base_value` is expected to be
/// finite and positive (validated by configuration).
pub fn compute_index(table: &PriceTable, base_value: f64) -> IndexResult {
    if table.is_empty() {
        debug!("empty price table, nothing to compound");
        return IndexResult::empty(base_value);
    }

    let filled = forward_fill(table);
    let returns = daily_returns(&filled);
    let mut composite = composite_returns(&returns);
    let active = active_counts(table);
    let dates = table.dates();

    let active_count: ActiveCount = dates
        .iter()
        .copied()
        .zip(active.iter().map(|&n| Some(n)))
        .collect();

    let Some(base_row) = active.iter().position(|&n| n > 0) else {
        debug!("no entity ever reports a price");
        return IndexResult {
            index: dates.iter().map(|&d| (d, None)).collect(),
            composite_returns: dates.iter().copied().zip(composite).collect(),
            daily_returns: returns,
            filled,
            active_count,
            base_value,
            outcome: IndexOutcome::NoActiveEntities,
        };
    };

    // Day one has no prior-day comparison.
    composite[base_row] = Some(0.0);

    let mut levels: Vec<Option<f64>> = vec![None; dates.len()];
    let mut level = base_value;
    levels[base_row] = Some(level);
    for row in base_row + 1..dates.len() {
        // Undefined composite after the base date is flat, never a terminator.
        level *= 1.0 + composite[row].unwrap_or(0.0);
        levels[row] = Some(level);
    }

    let base_date = dates[base_row];
    debug!(%base_date, base_value, dates = dates.len(), "index compounded");

    IndexResult {
        index: dates.iter().copied().zip(levels).collect(),
        composite_returns: dates.iter().copied().zip(composite).collect(),
        daily_returns: returns,
        filled,
        active_count,
        base_value,
        outcome: IndexOutcome::Computed { base_date },
    }
}
