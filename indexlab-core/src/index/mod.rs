//! Equal-weighted index construction: forward fill, returns, compounding

pub mod compound;
pub mod fill;
pub mod returns;

pub use compound::{
    active_counts, compute_index, ActiveCount, IndexOutcome, IndexResult, IndexSeries,
    IndexSummary,
};
pub use fill::forward_fill;
pub use returns::{composite_returns, daily_returns, mean_present};
