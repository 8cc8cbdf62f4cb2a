//! Ordered series and date × entity panels

pub mod date_series;
pub mod panel;

pub use date_series::{month_end, DateSeries};
pub use panel::{DailyReturnTable, FilledPriceTable, Panel, PriceTable};
