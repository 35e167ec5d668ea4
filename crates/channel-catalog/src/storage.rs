//! Persistent storage using RocksDB.
//!
//! Records are JSON values under typed key prefixes. Ids are zero-padded in
//! keys so prefix scans come back in ascending id order. Multi-record writes
//! go through [`StorageBatch`]; consistent multi-record reads go through
//! [`StoreSnapshot`].

use crate::error::{Error, Result};
use crate::models::{Attachment, Channel, Content, Group};
use rocksdb::{Direction, IteratorMode, Options, WriteBatch, DB};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

fn content_key(id: u64) -> String {
    format!("content:{:020}", id)
}

fn channel_key(id: u64) -> String {
    format!("channel:{:020}", id)
}

fn group_key(id: u64) -> String {
    format!("group:{:020}", id)
}

fn attachment_prefix(content_id: u64) -> String {
    format!("file:{:020}:", content_id)
}

fn attachment_key(content_id: u64, id: u64) -> String {
    format!("file:{:020}:{:020}", content_id, id)
}

/// Id sequences, one per record kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sequence {
    Content,
    Channel,
    Group,
    Attachment,
}

impl Sequence {
    fn key(self) -> &'static str {
        match self {
            Sequence::Content => "seq:content",
            Sequence::Channel => "seq:channel",
            Sequence::Group => "seq:group",
            Sequence::Attachment => "seq:file",
        }
    }
}

type RawItem = std::result::Result<(Box<[u8]>, Box<[u8]>), rocksdb::Error>;

fn collect_prefix<I>(iter: I, prefix: &str) -> Result<Vec<Vec<u8>>>
where
    I: Iterator<Item = RawItem>,
{
    let mut values = Vec::new();
    for item in iter {
        let (key, value) = item?;
        if key.starts_with(prefix.as_bytes()) {
            values.push(value.into_vec());
        } else {
            break;
        }
    }
    Ok(values)
}

/// Read access shared by the live store and its snapshots.
pub trait StoreRead {
    /// Raw value under a key.
    fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Raw values under a key prefix, in key order.
    fn scan_bytes(&self, prefix: &str) -> Result<Vec<Vec<u8>>>;

    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get_bytes(key)? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }

    fn scan_json<T: DeserializeOwned>(&self, prefix: &str) -> Result<Vec<T>> {
        self.scan_bytes(prefix)?
            .iter()
            .map(|data| serde_json::from_slice(data).map_err(Error::from))
            .collect()
    }

    // --- Contents ---

    /// Get a content by ID.
    fn get_content(&self, id: u64) -> Result<Option<Content>> {
        self.get_json(&content_key(id))
    }

    /// List all contents.
    fn list_contents(&self) -> Result<Vec<Content>> {
        self.scan_json("content:")
    }

    /// List the files attached to a content.
    fn list_attachments(&self, content_id: u64) -> Result<Vec<Attachment>> {
        self.scan_json(&attachment_prefix(content_id))
    }

    // --- Channels ---

    /// Get a channel by ID.
    fn get_channel(&self, id: u64) -> Result<Option<Channel>> {
        self.get_json(&channel_key(id))
    }

    /// List all channels.
    fn list_channels(&self) -> Result<Vec<Channel>> {
        self.scan_json("channel:")
    }

    // --- Groups ---

    /// Get a group by ID.
    fn get_group(&self, id: u64) -> Result<Option<Group>> {
        self.get_json(&group_key(id))
    }

    /// List all groups.
    fn list_groups(&self) -> Result<Vec<Group>> {
        self.scan_json("group:")
    }
}

/// Storage backend for catalog data.
pub struct Storage {
    db: DB,
}

impl Storage {
    /// Open or create storage at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        let db = DB::open(&opts, path)?;
        Ok(Self { db })
    }

    /// Take a point-in-time view of the store.
    pub fn snapshot(&self) -> StoreSnapshot<'_> {
        StoreSnapshot {
            snapshot: self.db.snapshot(),
        }
    }

    /// Start an atomic write batch.
    pub fn batch(&self) -> StorageBatch {
        StorageBatch {
            batch: WriteBatch::default(),
        }
    }

    /// Apply a write batch atomically.
    pub fn write(&self, batch: StorageBatch) -> Result<()> {
        self.db.write(batch.batch)?;
        Ok(())
    }

    /// Next unused id of a sequence.
    ///
    /// Does not reserve it: the caller records it with
    /// [`StorageBatch::record_id`] while holding the catalog writer lock.
    pub fn next_id(&self, sequence: Sequence) -> Result<u64> {
        let last = match self.db.get(sequence.key().as_bytes())? {
            Some(data) => serde_json::from_slice::<u64>(&data)?,
            None => 0,
        };
        Ok(last + 1)
    }
}

impl StoreRead for Storage {
    fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.db.get(key.as_bytes())?)
    }

    fn scan_bytes(&self, prefix: &str) -> Result<Vec<Vec<u8>>> {
        let iter = self
            .db
            .iterator(IteratorMode::From(prefix.as_bytes(), Direction::Forward));
        collect_prefix(iter, prefix)
    }
}

/// A consistent read-only view of the store.
pub struct StoreSnapshot<'a> {
    snapshot: rocksdb::Snapshot<'a>,
}

impl StoreRead for StoreSnapshot<'_> {
    fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.snapshot.get(key.as_bytes())?)
    }

    fn scan_bytes(&self, prefix: &str) -> Result<Vec<Vec<u8>>> {
        let iter = self
            .snapshot
            .iterator(IteratorMode::From(prefix.as_bytes(), Direction::Forward));
        collect_prefix(iter, prefix)
    }
}

/// Pending writes, applied all at once by [`Storage::write`].
pub struct StorageBatch {
    batch: WriteBatch,
}

impl StorageBatch {
    fn put_json<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_vec(value)?;
        self.batch.put(key.as_bytes(), value);
        Ok(())
    }

    /// Record the last id handed out by a sequence.
    pub fn record_id(&mut self, sequence: Sequence, id: u64) -> Result<()> {
        self.put_json(sequence.key(), &id)
    }

    pub fn put_content(&mut self, content: &Content) -> Result<()> {
        self.put_json(&content_key(content.id), content)
    }

    pub fn delete_content(&mut self, id: u64) {
        self.batch.delete(content_key(id).as_bytes());
    }

    pub fn put_attachment(&mut self, attachment: &Attachment) -> Result<()> {
        self.put_json(
            &attachment_key(attachment.content_id, attachment.id),
            attachment,
        )
    }

    pub fn delete_attachment(&mut self, attachment: &Attachment) {
        self.batch
            .delete(attachment_key(attachment.content_id, attachment.id).as_bytes());
    }

    pub fn put_channel(&mut self, channel: &Channel) -> Result<()> {
        self.put_json(&channel_key(channel.id), channel)
    }

    pub fn delete_channel(&mut self, id: u64) {
        self.batch.delete(channel_key(id).as_bytes());
    }

    pub fn put_group(&mut self, group: &Group) -> Result<()> {
        self.put_json(&group_key(group.id), group)
    }

    pub fn delete_group(&mut self, id: u64) {
        self.batch.delete(group_key(id).as_bytes());
    }
}
