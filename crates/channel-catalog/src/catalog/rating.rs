//! Hierarchical rating aggregation.
//!
//! A leaf channel averages the ratings of its rated contents. An internal
//! channel averages the averages of its subchannels, each counted once no
//! matter how many contents sit beneath it. Children without a rating are
//! left out; a channel with nothing to average has no rating.

use super::Catalog;
use crate::error::{Error, Result};
use crate::models::Channel;
use crate::storage::StoreRead;
use std::collections::{HashMap, HashSet};

/// Computes channel ratings over one consistent view of the store.
///
/// Results are memoized for the lifetime of the aggregator, so shared
/// subtrees are walked once per pass.
pub struct RatingAggregator<'s, R: StoreRead> {
    store: &'s R,
    memo: HashMap<u64, Option<f64>>,
}

impl<'s, R: StoreRead> RatingAggregator<'s, R> {
    pub fn new(store: &'s R) -> Self {
        Self {
            store,
            memo: HashMap::new(),
        }
    }

    /// Average rating of a channel, `None` if nothing beneath it is rated.
    pub fn average_rating(&mut self, channel_id: u64) -> Result<Option<f64>> {
        let channel = self
            .store
            .get_channel(channel_id)?
            .ok_or_else(|| Error::channel_not_found(channel_id))?;
        self.rate(&channel)
    }

    /// Average rating of an already loaded channel.
    pub fn rate(&mut self, channel: &Channel) -> Result<Option<f64>> {
        let mut path = HashSet::new();
        self.visit(channel, &mut path)
    }

    fn visit(&mut self, channel: &Channel, path: &mut HashSet<u64>) -> Result<Option<f64>> {
        if let Some(&cached) = self.memo.get(&channel.id) {
            return Ok(cached);
        }
        path.insert(channel.id);

        let average = if !channel.subchannels.is_empty() {
            let mut averages = Vec::with_capacity(channel.subchannels.len());
            for &child_id in &channel.subchannels {
                if path.contains(&child_id) {
                    return Err(Error::CycleDetected {
                        parent: channel.id,
                        child: child_id,
                    });
                }
                let Some(child) = self.store.get_channel(child_id)? else {
                    tracing::warn!(channel_id = channel.id, child_id, "Skipping missing subchannel");
                    continue;
                };
                if let Some(average) = self.visit(&child, path)? {
                    averages.push(average);
                }
            }
            mean(&averages)
        } else if !channel.contents.is_empty() {
            let mut ratings = Vec::with_capacity(channel.contents.len());
            for &content_id in &channel.contents {
                match self.store.get_content(content_id)? {
                    Some(content) => {
                        if let Some(rating) = content.rating {
                            ratings.push(rating.value());
                        }
                    }
                    None => {
                        tracing::warn!(channel_id = channel.id, content_id, "Skipping missing content");
                    }
                }
            }
            mean(&ratings)
        } else {
            None
        };

        path.remove(&channel.id);
        self.memo.insert(channel.id, average);
        tracing::debug!(channel_id = channel.id, ?average, "Rated channel");
        Ok(average)
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

impl Catalog {
    /// Average rating of a channel, read from a single snapshot.
    ///
    /// `Ok(None)` means the channel exists but nothing beneath it is rated.
    pub fn average_rating(&self, channel_id: u64) -> Result<Option<f64>> {
        let snapshot = self.storage.snapshot();
        let mut aggregator = RatingAggregator::new(&snapshot);
        aggregator.average_rating(channel_id)
    }
}
