//! Catalog models.
//!
//! # Core Types
//!
//! - [`Content`] - A rated media record
//! - [`Channel`] - A node of the catalog tree, holding contents or subchannels
//! - [`Group`] - A tag for filtering channels
//!
//! # Supporting Types
//!
//! - [`Rating`] - Validated fixed-point rating in [0, 10]
//! - [`ContentUpdate`] - Mutable fields of an existing content
//! - [`ChannelKind`] - Leaf (contents) or internal (subchannels)
//! - [`Attachment`] - File attached to a content

mod attachment;
mod channel;
mod content;
mod group;

pub use attachment::{validate_file_name, Attachment, ALLOWED_EXTENSIONS};
pub use channel::{Channel, ChannelKind};
pub use content::{Content, ContentUpdate, Rating};
pub use group::Group;

pub(crate) use content::check_metadata;
