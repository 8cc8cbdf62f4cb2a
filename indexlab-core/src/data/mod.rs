//! Raw sheet intake and normalization

pub mod error;
pub mod normalize;
pub mod parse;
pub mod raw;

pub use error::DataError;
pub use normalize::{
    normalize, normalize_with, EntityReport, NormalizeReport, Normalized, TableShape,
};
pub use parse::{parse_date_column, parse_price, DateFormat, DateOrder};
pub use raw::{RawColumn, RawDataset};
