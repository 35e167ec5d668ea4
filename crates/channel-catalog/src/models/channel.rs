//! Channel model - a node in the catalog tree.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What a committed channel holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// Holds contents only
    Leaf,
    /// Holds subchannels only
    Internal,
}

/// A named node in the catalog tree.
///
/// A committed channel holds either contents or subchannels, never both and
/// never neither. A freshly created channel holds nothing until it is
/// populated. References are not owned: the channel only records ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    /// Store-assigned identifier
    pub id: u64,

    /// Human-readable title
    pub title: String,

    /// Language code (e.g. "EN")
    pub language: String,

    /// Content ids held by a leaf channel
    #[serde(default)]
    pub contents: BTreeSet<u64>,

    /// Child channel ids held by an internal channel
    #[serde(default)]
    pub subchannels: BTreeSet<u64>,

    /// Group tags
    #[serde(default)]
    pub groups: BTreeSet<u64>,
}

impl Channel {
    /// Create a new, still empty channel.
    pub fn new(id: u64, title: String, language: String) -> Self {
        Self {
            id,
            title,
            language,
            contents: BTreeSet::new(),
            subchannels: BTreeSet::new(),
            groups: BTreeSet::new(),
        }
    }

    /// The channel kind, or `None` while the composition is invalid.
    pub fn kind(&self) -> Option<ChannelKind> {
        match (self.contents.is_empty(), self.subchannels.is_empty()) {
            (false, true) => Some(ChannelKind::Leaf),
            (true, false) => Some(ChannelKind::Internal),
            _ => None,
        }
    }

    /// Check the exclusivity and non-emptiness invariant.
    pub fn check_composition(&self) -> Result<ChannelKind> {
        match (self.contents.is_empty(), self.subchannels.is_empty()) {
            (false, true) => Ok(ChannelKind::Leaf),
            (true, false) => Ok(ChannelKind::Internal),
            (false, false) => Err(Error::StructuralViolation(format!(
                "channel {} cannot have both contents and subchannels",
                self.id
            ))),
            (true, true) => Err(Error::StructuralViolation(format!(
                "channel {} must have at least one content or one subchannel",
                self.id
            ))),
        }
    }
}
