//! Content store operations.

use super::Catalog;
use crate::error::{Error, Result};
use crate::models::{check_metadata, Attachment, Content, ContentUpdate, Rating};
use crate::storage::{Sequence, StoreRead};

impl Catalog {
    /// Create a content.
    ///
    /// Fails with `InvalidRating` if `rating` is outside [0, 10].
    pub fn create_content(
        &self,
        title: impl Into<String>,
        metadata: serde_json::Value,
        rating: Option<f64>,
    ) -> Result<Content> {
        let rating = rating.map(Rating::new).transpose()?;
        check_metadata(&metadata)?;

        let _guard = self.write_guard()?;
        let id = self.storage.next_id(Sequence::Content)?;
        let content = Content::new(id, title.into(), metadata, rating);

        let mut batch = self.storage.batch();
        batch.record_id(Sequence::Content, id)?;
        batch.put_content(&content)?;
        self.storage.write(batch)?;

        tracing::info!(content_id = id, title = %content.title, "Created content");
        Ok(content)
    }

    /// Update the metadata and/or rating of a content.
    pub fn update_content(&self, id: u64, update: ContentUpdate) -> Result<Content> {
        let rating = update
            .rating
            .map(|rating| rating.map(Rating::new).transpose())
            .transpose()?;
        if let Some(metadata) = &update.metadata {
            check_metadata(metadata)?;
        }

        let _guard = self.write_guard()?;
        let mut content = self.get_content(id)?;
        if let Some(metadata) = update.metadata {
            content.metadata = metadata;
        }
        if let Some(rating) = rating {
            content.rating = rating;
        }

        let mut batch = self.storage.batch();
        batch.put_content(&content)?;
        self.storage.write(batch)?;

        tracing::info!(content_id = id, "Updated content");
        Ok(content)
    }

    /// Get a content by ID.
    pub fn get_content(&self, id: u64) -> Result<Content> {
        self.storage
            .get_content(id)?
            .ok_or_else(|| Error::content_not_found(id))
    }

    /// List all contents.
    pub fn list_contents(&self) -> Result<Vec<Content>> {
        self.storage.list_contents()
    }

    /// Delete a content, its attachments, and every channel reference to it.
    ///
    /// Channels that held only this content are left empty, not deleted.
    pub fn delete_content(&self, id: u64) -> Result<()> {
        let _guard = self.write_guard()?;
        self.get_content(id)?;

        let mut batch = self.storage.batch();
        batch.delete_content(id);
        for attachment in self.storage.list_attachments(id)? {
            batch.delete_attachment(&attachment);
        }

        let mut scrubbed = 0;
        for mut channel in self.storage.list_channels()? {
            if channel.contents.remove(&id) {
                if channel.contents.is_empty() {
                    tracing::warn!(
                        channel_id = channel.id,
                        content_id = id,
                        "Channel lost its last content"
                    );
                }
                batch.put_channel(&channel)?;
                scrubbed += 1;
            }
        }
        self.storage.write(batch)?;

        tracing::info!(content_id = id, channels = scrubbed, "Deleted content");
        Ok(())
    }

    /// Attach a file to a content without touching the content record.
    pub fn attach_file(&self, content_id: u64, file_name: impl Into<String>) -> Result<Attachment> {
        let file_name = file_name.into();

        let _guard = self.write_guard()?;
        self.get_content(content_id)?;
        let id = self.storage.next_id(Sequence::Attachment)?;
        let attachment = Attachment::new(id, content_id, file_name)?;

        let mut batch = self.storage.batch();
        batch.record_id(Sequence::Attachment, id)?;
        batch.put_attachment(&attachment)?;
        self.storage.write(batch)?;

        tracing::info!(
            content_id,
            file = %attachment.file_name,
            file_type = attachment.file_type(),
            "Attached file"
        );
        Ok(attachment)
    }

    /// Files attached to a content.
    pub fn attachments(&self, content_id: u64) -> Result<Vec<Attachment>> {
        self.get_content(content_id)?;
        self.storage.list_attachments(content_id)
    }
}
