//! Group model - a tag for filtering channels.

use serde::{Deserialize, Serialize};

/// A tag attachable to channels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Group {
    /// Store-assigned identifier
    pub id: u64,

    /// Human-readable name, matched exactly when filtering
    pub name: String,
}

impl Group {
    /// Create a new group.
    pub fn new(id: u64, name: String) -> Self {
        Self { id, name }
    }
}
