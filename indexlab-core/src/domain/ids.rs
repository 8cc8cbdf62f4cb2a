use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity identifier, taken from the price column label (ticker or company name).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build an id from a raw column header.
    ///
    /// Labels are trimmed. A blank header gets a positional name
    /// (`column_<n>`, 1-based) so the entity stays addressable.
    pub fn from_label(label: &str, position: usize) -> Self {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            Self(format!("column_{}", position + 1))
        } else {
            Self(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Deterministic dataset hash (content hash of the canonical price table)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetHash(pub String);

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
