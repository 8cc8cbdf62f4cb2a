//! Daily returns and the equal-weighted composite.

use crate::series::{DailyReturnTable, FilledPriceTable};

/// Simple daily returns for every entity of a forward-filled table.
pub fn daily_returns(filled: &FilledPriceTable) -> DailyReturnTable {
    let columns = filled
        .columns()
        .map(|(_, column)| column_returns(column))
        .collect();
    filled.with_columns(columns)
}

/// `price[t] / price[t-1] - 1` wherever both prices exist.
///
/// The first row and every row whose previous price is absent get `None`.
/// A zero previous price also yields `None` rather than an infinite return.
pub fn column_returns(column: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(column.len());
    if column.is_empty() {
        return out;
    }
    out.push(None);
    for pair in column.windows(2) {
        let ret = match (pair[0], pair[1]) {
            (Some(prev), Some(curr)) if prev != 0.0 => Some(curr / prev - 1.0),
            _ => None,
        };
        out.push(ret);
    }
    out
}

/// Arithmetic mean of the present values; `None` if there are none.
pub fn mean_present<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Equal-weighted composite return per row.
///
/// Entities without a defined return on a row (not yet listed, or on their
/// first row) are left out of that row's mean.
pub fn composite_returns(returns: &DailyReturnTable) -> Vec<Option<f64>> {
    (0..returns.n_dates())
        .map(|row| mean_present(returns.row(row)))
        .collect()
}
