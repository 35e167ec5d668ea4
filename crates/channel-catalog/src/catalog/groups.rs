//! Group operations.

use super::Catalog;
use crate::error::{Error, Result};
use crate::models::Group;
use crate::storage::{Sequence, StoreRead};

impl Catalog {
    /// Create a group.
    pub fn create_group(&self, name: impl Into<String>) -> Result<Group> {
        let _guard = self.write_guard()?;
        let id = self.storage.next_id(Sequence::Group)?;
        let group = Group::new(id, name.into());

        let mut batch = self.storage.batch();
        batch.record_id(Sequence::Group, id)?;
        batch.put_group(&group)?;
        self.storage.write(batch)?;

        tracing::info!(group_id = id, name = %group.name, "Created group");
        Ok(group)
    }

    /// Get a group by ID.
    pub fn get_group(&self, id: u64) -> Result<Group> {
        self.storage
            .get_group(id)?
            .ok_or_else(|| Error::group_not_found(id))
    }

    /// List all groups.
    pub fn list_groups(&self) -> Result<Vec<Group>> {
        self.storage.list_groups()
    }

    /// Delete a group and untag every channel carrying it.
    pub fn delete_group(&self, id: u64) -> Result<()> {
        let _guard = self.write_guard()?;
        self.get_group(id)?;

        let mut batch = self.storage.batch();
        batch.delete_group(id);
        for mut channel in self.storage.list_channels()? {
            if channel.groups.remove(&id) {
                batch.put_channel(&channel)?;
            }
        }
        self.storage.write(batch)?;

        tracing::info!(group_id = id, "Deleted group");
        Ok(())
    }
}
