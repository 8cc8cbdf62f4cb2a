//! Per-entity forward fill.

use crate::series::{FilledPriceTable, PriceTable};

/// Forward-fill every entity's column.
///
/// Gaps take the most recent known price. Cells before an entity's first
/// recorded price stay `None`: nothing is ever back-filled.
pub fn forward_fill(table: &PriceTable) -> FilledPriceTable {
    let columns = table
        .columns()
        .map(|(_, column)| forward_fill_column(column))
        .collect();
    table.with_columns(columns)
}

pub fn forward_fill_column(column: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut last = None;
    column
        .iter()
        .map(|cell| {
            if cell.is_some() {
                last = *cell;
            }
            last
        })
        .collect()
}
