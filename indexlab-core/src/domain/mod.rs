//! Domain types for IndexLab

pub mod ids;

pub use ids::{DatasetHash, EntityId};
