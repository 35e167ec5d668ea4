//! Catalog service - the write path and read facade over [`Storage`].
//!
//! Every mutating call validates its input and the structural invariants
//! before anything is written, then commits in one atomic batch. Mutations
//! are serialized through a single writer lock, so checks such as the cycle
//! test always see the graph they guard. Reads take no lock; aggregated
//! reads run against a store snapshot.

mod channels;
mod contents;
mod groups;
mod query;
mod rating;
mod tree;

pub use query::{ChannelFilter, ChannelView, ContentView};
pub use rating::RatingAggregator;

use crate::error::{Error, Result};
use crate::storage::Storage;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Channel/content catalog.
pub struct Catalog {
    storage: Arc<Storage>,
    writer: Mutex<()>,
}

impl Catalog {
    /// Wrap an opened store.
    pub fn new(storage: Arc<Storage>) -> Self {
        Self {
            storage,
            writer: Mutex::new(()),
        }
    }

    /// Open or create a catalog at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(Arc::new(Storage::open(path)?)))
    }

    /// Underlying store.
    pub fn storage(&self) -> &Arc<Storage> {
        &self.storage
    }

    fn write_guard(&self) -> Result<MutexGuard<'_, ()>> {
        self.writer
            .lock()
            .map_err(|_| Error::Storage("catalog writer lock poisoned".to_string()))
    }
}
