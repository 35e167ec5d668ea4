//! Channel tree operations.

use super::{tree, Catalog};
use crate::error::{Error, Result};
use crate::models::{Channel, ChannelKind};
use crate::storage::{Sequence, StoreRead};
use std::collections::BTreeSet;

impl Catalog {
    /// Create an empty channel.
    ///
    /// The channel is uncommitted until [`Catalog::set_contents`] or
    /// [`Catalog::set_subchannels`] populates it.
    pub fn create_channel(
        &self,
        title: impl Into<String>,
        language: impl Into<String>,
    ) -> Result<Channel> {
        let _guard = self.write_guard()?;
        let id = self.storage.next_id(Sequence::Channel)?;
        let channel = Channel::new(id, title.into(), language.into());

        let mut batch = self.storage.batch();
        batch.record_id(Sequence::Channel, id)?;
        batch.put_channel(&channel)?;
        self.storage.write(batch)?;

        tracing::info!(channel_id = id, title = %channel.title, "Created channel");
        Ok(channel)
    }

    /// Get a channel by ID.
    pub fn get_channel(&self, id: u64) -> Result<Channel> {
        self.storage
            .get_channel(id)?
            .ok_or_else(|| Error::channel_not_found(id))
    }

    /// Replace the contents of a leaf channel.
    ///
    /// Fails with `StructuralViolation` if the channel holds subchannels or
    /// `content_ids` is empty. Nothing is written on failure.
    pub fn set_contents(
        &self,
        channel_id: u64,
        content_ids: impl IntoIterator<Item = u64>,
    ) -> Result<Channel> {
        let content_ids: BTreeSet<u64> = content_ids.into_iter().collect();

        let _guard = self.write_guard()?;
        let mut channel = self.get_channel(channel_id)?;
        if !channel.subchannels.is_empty() {
            return Err(Error::StructuralViolation(format!(
                "channel {} has subchannels and cannot hold contents",
                channel_id
            )));
        }
        for &content_id in &content_ids {
            if self.storage.get_content(content_id)?.is_none() {
                return Err(Error::content_not_found(content_id));
            }
        }

        channel.contents = content_ids;
        channel.check_composition()?;

        let mut batch = self.storage.batch();
        batch.put_channel(&channel)?;
        self.storage.write(batch)?;

        tracing::info!(
            channel_id,
            contents = channel.contents.len(),
            "Set channel contents"
        );
        Ok(channel)
    }

    /// Replace the subchannels of an internal channel.
    ///
    /// Fails with `StructuralViolation` if the channel holds contents or
    /// `subchannel_ids` is empty, and with `CycleDetected` if any id is the
    /// channel itself or already leads back to it.
    pub fn set_subchannels(
        &self,
        channel_id: u64,
        subchannel_ids: impl IntoIterator<Item = u64>,
    ) -> Result<Channel> {
        let subchannel_ids: BTreeSet<u64> = subchannel_ids.into_iter().collect();

        let _guard = self.write_guard()?;
        let mut channel = self.get_channel(channel_id)?;
        if !channel.contents.is_empty() {
            return Err(Error::StructuralViolation(format!(
                "channel {} has contents and cannot hold subchannels",
                channel_id
            )));
        }
        if subchannel_ids.contains(&channel_id) {
            return Err(Error::CycleDetected {
                parent: channel_id,
                child: channel_id,
            });
        }
        for &child_id in &subchannel_ids {
            if self.storage.get_channel(child_id)?.is_none() {
                return Err(Error::channel_not_found(child_id));
            }
        }
        tree::check_new_edges(&*self.storage, channel_id, &subchannel_ids)?;

        channel.subchannels = subchannel_ids;
        channel.check_composition()?;

        let mut batch = self.storage.batch();
        batch.put_channel(&channel)?;
        self.storage.write(batch)?;

        tracing::info!(
            channel_id,
            subchannels = channel.subchannels.len(),
            "Set subchannels"
        );
        Ok(channel)
    }

    /// Replace the group tags of a channel. An empty set is allowed.
    pub fn set_groups(
        &self,
        channel_id: u64,
        group_ids: impl IntoIterator<Item = u64>,
    ) -> Result<Channel> {
        let group_ids: BTreeSet<u64> = group_ids.into_iter().collect();

        let _guard = self.write_guard()?;
        let mut channel = self.get_channel(channel_id)?;
        for &group_id in &group_ids {
            if self.storage.get_group(group_id)?.is_none() {
                return Err(Error::group_not_found(group_id));
            }
        }
        channel.groups = group_ids;

        let mut batch = self.storage.batch();
        batch.put_channel(&channel)?;
        self.storage.write(batch)?;

        tracing::info!(channel_id, groups = channel.groups.len(), "Set channel groups");
        Ok(channel)
    }

    /// Re-check that a channel is committed: contents or subchannels,
    /// exclusively.
    pub fn validate_channel(&self, channel_id: u64) -> Result<ChannelKind> {
        self.get_channel(channel_id)?.check_composition()
    }

    /// Delete a channel and drop it from every parent's subchannels.
    ///
    /// Parents left without subchannels are kept, uncommitted.
    pub fn delete_channel(&self, channel_id: u64) -> Result<()> {
        let _guard = self.write_guard()?;
        self.get_channel(channel_id)?;

        let mut batch = self.storage.batch();
        batch.delete_channel(channel_id);

        let mut scrubbed = 0;
        for mut parent in self.storage.list_channels()? {
            if parent.subchannels.remove(&channel_id) {
                if parent.subchannels.is_empty() {
                    tracing::warn!(
                        channel_id = parent.id,
                        subchannel_id = channel_id,
                        "Channel lost its last subchannel"
                    );
                }
                batch.put_channel(&parent)?;
                scrubbed += 1;
            }
        }
        self.storage.write(batch)?;

        tracing::info!(channel_id, parents = scrubbed, "Deleted channel");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::catalog;
    use super::*;
    use serde_json::json;

    #[test]
    fn create_starts_uncommitted() {
        let (_dir, catalog) = catalog();
        let channel = catalog.create_channel("Channel 1", "EN").unwrap();

        assert!(channel.contents.is_empty());
        assert!(channel.subchannels.is_empty());
        assert!(matches!(
            catalog.validate_channel(channel.id),
            Err(Error::StructuralViolation(_))
        ));
    }

    #[test]
    fn set_contents_commits_leaf() {
        let (_dir, catalog) = catalog();
        let a = catalog.create_content("A", json!({}), Some(8.5)).unwrap();
        let channel = catalog.create_channel("Channel 1", "EN").unwrap();

        let channel = catalog.set_contents(channel.id, [a.id, a.id]).unwrap();
        assert_eq!(channel.contents.len(), 1);
        assert_eq!(catalog.validate_channel(channel.id).unwrap(), ChannelKind::Leaf);
    }

    #[test]
    fn set_contents_rejects_empty() {
        let (_dir, catalog) = catalog();
        let channel = catalog.create_channel("Channel 1", "EN").unwrap();

        assert!(matches!(
            catalog.set_contents(channel.id, Vec::<u64>::new()),
            Err(Error::StructuralViolation(_))
        ));
    }

    #[test]
    fn leaf_cannot_take_subchannels() {
        let (_dir, catalog) = catalog();
        let a = catalog.create_content("A", json!({}), None).unwrap();
        let leaf = catalog.create_channel("Leaf", "EN").unwrap();
        let other = catalog.create_channel("Other", "EN").unwrap();
        catalog.set_contents(leaf.id, [a.id]).unwrap();

        assert!(matches!(
            catalog.set_subchannels(leaf.id, [other.id]),
            Err(Error::StructuralViolation(_))
        ));
        let leaf = catalog.get_channel(leaf.id).unwrap();
        assert!(leaf.subchannels.is_empty());
        assert_eq!(leaf.contents.len(), 1);
    }

    #[test]
    fn internal_cannot_take_contents() {
        let (_dir, catalog) = catalog();
        let a = catalog.create_content("A", json!({}), None).unwrap();
        let parent = catalog.create_channel("Parent", "EN").unwrap();
        let child = catalog.create_channel("Child", "EN").unwrap();
        catalog.set_subchannels(parent.id, [child.id]).unwrap();

        assert!(matches!(
            catalog.set_contents(parent.id, [a.id]),
            Err(Error::StructuralViolation(_))
        ));
        assert!(catalog.get_channel(parent.id).unwrap().contents.is_empty());
    }

    #[test]
    fn unknown_references_rejected() {
        let (_dir, catalog) = catalog();
        let channel = catalog.create_channel("Channel", "EN").unwrap();

        assert!(matches!(
            catalog.set_contents(channel.id, [7]),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            catalog.set_subchannels(channel.id, [7]),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            catalog.set_groups(channel.id, [7]),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            catalog.set_contents(99, Vec::<u64>::new()),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn self_reference_is_cycle() {
        let (_dir, catalog) = catalog();
        let a = catalog.create_channel("A", "EN").unwrap();

        assert!(matches!(
            catalog.set_subchannels(a.id, [a.id]),
            Err(Error::CycleDetected { .. })
        ));
    }

    #[test]
    fn two_step_cycle_rejected() {
        let (_dir, catalog) = catalog();
        let a = catalog.create_channel("A", "EN").unwrap();
        let b = catalog.create_channel("B", "EN").unwrap();
        catalog.set_subchannels(a.id, [b.id]).unwrap();

        let err = catalog.set_subchannels(b.id, [a.id]).unwrap_err();
        assert!(matches!(err, Error::CycleDetected { parent, child } if parent == b.id && child == a.id));
        assert!(catalog.get_channel(b.id).unwrap().subchannels.is_empty());
    }

    #[test]
    fn concurrent_opposite_edges_admit_one() {
        use std::sync::{Arc, Barrier};
        use std::thread;

        for _ in 0..20 {
            let (_dir, catalog) = catalog();
            let catalog = Arc::new(catalog);
            let a = catalog.create_channel("A", "EN").unwrap().id;
            let b = catalog.create_channel("B", "EN").unwrap().id;
            let barrier = Arc::new(Barrier::new(2));

            let handles: Vec<_> = [(a, b), (b, a)]
                .into_iter()
                .map(|(parent, child)| {
                    let catalog = Arc::clone(&catalog);
                    let barrier = Arc::clone(&barrier);
                    thread::spawn(move || {
                        barrier.wait();
                        catalog.set_subchannels(parent, [child])
                    })
                })
                .collect();
            let results: Vec<_> = handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect();

            assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
            assert_eq!(
                results
                    .iter()
                    .filter(|r| matches!(r, Err(Error::CycleDetected { .. })))
                    .count(),
                1
            );

            let a = catalog.get_channel(a).unwrap();
            let b = catalog.get_channel(b).unwrap();
            assert!(a.subchannels.is_empty() || b.subchannels.is_empty());
        }
    }

    #[test]
    fn shared_child_is_allowed() {
        let (_dir, catalog) = catalog();
        let a = catalog.create_channel("A", "EN").unwrap();
        let b = catalog.create_channel("B", "EN").unwrap();
        let shared = catalog.create_channel("Shared", "EN").unwrap();

        catalog.set_subchannels(a.id, [shared.id]).unwrap();
        catalog.set_subchannels(b.id, [shared.id]).unwrap();
        catalog.set_subchannels(a.id, [b.id, shared.id]).unwrap();
    }

    #[test]
    fn groups_can_be_set_and_cleared() {
        let (_dir, catalog) = catalog();
        let group = catalog.create_group("Group 1").unwrap();
        let channel = catalog.create_channel("Channel", "EN").unwrap();

        let channel = catalog.set_groups(channel.id, [group.id]).unwrap();
        assert!(channel.groups.contains(&group.id));
        let channel = catalog.set_groups(channel.id, Vec::<u64>::new()).unwrap();
        assert!(channel.groups.is_empty());
    }

    #[test]
    fn delete_scrubs_parent_references() {
        let (_dir, catalog) = catalog();
        let parent = catalog.create_channel("Parent", "EN").unwrap();
        let keep = catalog.create_channel("Keep", "EN").unwrap();
        let gone = catalog.create_channel("Gone", "EN").unwrap();
        catalog.set_subchannels(parent.id, [keep.id, gone.id]).unwrap();

        catalog.delete_channel(gone.id).unwrap();

        assert!(matches!(catalog.get_channel(gone.id), Err(Error::NotFound(_))));
        let parent = catalog.get_channel(parent.id).unwrap();
        assert_eq!(parent.subchannels, BTreeSet::from([keep.id]));
    }

    #[test]
    fn delete_last_child_leaves_parent_uncommitted() {
        let (_dir, catalog) = catalog();
        let parent = catalog.create_channel("Parent", "EN").unwrap();
        let child = catalog.create_channel("Child", "EN").unwrap();
        catalog.set_subchannels(parent.id, [child.id]).unwrap();

        catalog.delete_channel(child.id).unwrap();

        assert!(matches!(
            catalog.validate_channel(parent.id),
            Err(Error::StructuralViolation(_))
        ));
    }
}
