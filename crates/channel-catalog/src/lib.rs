//! Channel Catalog - rated media organized into channel trees
//!
//! Contents carry an optional rating in [0, 10]. Channels hold either
//! contents or subchannels, never both, and subchannels never form a cycle.
//! A channel's average rating is the mean of its contents' ratings, or of its
//! subchannels' averages, one level at a time.
//!
//! # Architecture
//!
//! - **Models**: Record types (Content, Channel, Group, Attachment)
//! - **Storage**: RocksDB-backed persistent storage
//! - **Catalog**: Validated writes, rating aggregation, filtered queries
//! - **Export**: Ranked channel ratings as delimited text
//! - **API**: Read-only HTTP endpoints
//! - **Admin Socket**: Unix socket for edits (catalog-admin CLI)
//!
//! # Example
//!
//! ```no_run
//! use channel_catalog::Catalog;
//! use serde_json::json;
//!
//! fn main() -> channel_catalog::Result<()> {
//!     let catalog = Catalog::open("./catalog-data/db")?;
//!     let content = catalog.create_content("Pilot", json!({}), Some(8.5))?;
//!     let channel = catalog.create_channel("Drama", "EN")?;
//!     catalog.set_contents(channel.id, [content.id])?;
//!     assert_eq!(catalog.average_rating(channel.id)?, Some(8.5));
//!     Ok(())
//! }
//! ```

pub mod admin_socket;
pub mod api;
pub mod catalog;
pub mod error;
pub mod export;
pub mod models;
pub mod node;
pub mod storage;

pub use catalog::{Catalog, ChannelFilter, ChannelView, ContentView, RatingAggregator};
pub use error::{Error, Result};
pub use export::{ChannelRating, DEFAULT_EXPORT_FILE};
pub use models::{Attachment, Channel, ChannelKind, Content, ContentUpdate, Group, Rating};
pub use node::{CatalogConfig, CatalogNode};
pub use storage::Storage;
