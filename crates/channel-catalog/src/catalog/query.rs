//! Read-only projections over channels, contents and groups.

use super::rating::RatingAggregator;
use super::Catalog;
use crate::error::{Error, Result};
use crate::models::{Attachment, Channel, Content, Group};
use crate::storage::StoreRead;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Optional group filter for channel listings. Both fields must match when
/// both are set.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChannelFilter {
    /// Keep channels tagged with this group id
    pub group_id: Option<u64>,

    /// Keep channels tagged with a group of exactly this name
    pub group_name: Option<String>,
}

impl ChannelFilter {
    pub fn by_group_id(group_id: u64) -> Self {
        Self {
            group_id: Some(group_id),
            group_name: None,
        }
    }

    pub fn by_group_name(name: impl Into<String>) -> Self {
        Self {
            group_id: None,
            group_name: Some(name.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.group_id.is_none() && self.group_name.is_none()
    }

    fn matches(&self, channel: &Channel, groups: &HashMap<u64, Group>) -> bool {
        if let Some(group_id) = self.group_id {
            if !channel.groups.contains(&group_id) {
                return false;
            }
        }
        if let Some(name) = &self.group_name {
            let named = channel
                .groups
                .iter()
                .filter_map(|id| groups.get(id))
                .any(|group| &group.name == name);
            if !named {
                return false;
            }
        }
        true
    }
}

/// A content together with its attached files.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentView {
    #[serde(flatten)]
    pub content: Content,
    pub files: Vec<Attachment>,
}

/// A channel with its contents or subchannels expanded recursively and its
/// aggregated rating.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelView {
    pub id: u64,
    pub title: String,
    pub language: String,
    pub groups: Vec<u64>,
    pub contents: Vec<ContentView>,
    pub subchannels: Vec<ChannelView>,
    pub average_rating: Option<f64>,
}

struct ViewBuilder<'s, R: StoreRead> {
    store: &'s R,
    ratings: RatingAggregator<'s, R>,
}

impl<'s, R: StoreRead> ViewBuilder<'s, R> {
    fn new(store: &'s R) -> Self {
        Self {
            store,
            ratings: RatingAggregator::new(store),
        }
    }

    fn content_view(&self, content: Content) -> Result<ContentView> {
        let files = self.store.list_attachments(content.id)?;
        Ok(ContentView { content, files })
    }

    fn channel_view(&mut self, channel: &Channel, path: &mut HashSet<u64>) -> Result<ChannelView> {
        path.insert(channel.id);

        let mut contents = Vec::with_capacity(channel.contents.len());
        for &content_id in &channel.contents {
            if let Some(content) = self.store.get_content(content_id)? {
                contents.push(self.content_view(content)?);
            }
        }

        let mut subchannels = Vec::with_capacity(channel.subchannels.len());
        for &child_id in &channel.subchannels {
            if path.contains(&child_id) {
                return Err(Error::CycleDetected {
                    parent: channel.id,
                    child: child_id,
                });
            }
            if let Some(child) = self.store.get_channel(child_id)? {
                subchannels.push(self.channel_view(&child, path)?);
            }
        }

        path.remove(&channel.id);
        Ok(ChannelView {
            id: channel.id,
            title: channel.title.clone(),
            language: channel.language.clone(),
            groups: channel.groups.iter().copied().collect(),
            contents,
            subchannels,
            average_rating: self.ratings.rate(channel)?,
        })
    }

    fn view(&mut self, channel: &Channel) -> Result<ChannelView> {
        self.channel_view(channel, &mut HashSet::new())
    }
}

fn filter_channels<R: StoreRead>(store: &R, filter: &ChannelFilter) -> Result<Vec<Channel>> {
    let channels = store.list_channels()?;
    if filter.is_empty() {
        return Ok(channels);
    }

    let groups: HashMap<u64, Group> = store
        .list_groups()?
        .into_iter()
        .map(|group| (group.id, group))
        .collect();
    Ok(channels
        .into_iter()
        .filter(|channel| filter.matches(channel, &groups))
        .collect())
}

impl Catalog {
    /// List channels, optionally filtered by group.
    pub fn list_channels(&self, filter: &ChannelFilter) -> Result<Vec<Channel>> {
        filter_channels(&*self.storage, filter)
    }

    /// Expanded views of the channels matching `filter`, from one snapshot.
    pub fn channel_views(&self, filter: &ChannelFilter) -> Result<Vec<ChannelView>> {
        let snapshot = self.storage.snapshot();
        let channels = filter_channels(&snapshot, filter)?;
        let mut builder = ViewBuilder::new(&snapshot);
        let views = channels
            .iter()
            .map(|channel| builder.view(channel))
            .collect::<Result<Vec<_>>>()?;
        Ok(views)
    }

    /// Expanded view of one channel.
    pub fn channel_view(&self, channel_id: u64) -> Result<ChannelView> {
        let snapshot = self.storage.snapshot();
        let channel = snapshot
            .get_channel(channel_id)?
            .ok_or_else(|| Error::channel_not_found(channel_id))?;
        let mut builder = ViewBuilder::new(&snapshot);
        let view = builder.view(&channel)?;
        Ok(view)
    }

    /// All contents with their files.
    pub fn content_views(&self) -> Result<Vec<ContentView>> {
        let snapshot = self.storage.snapshot();
        let builder = ViewBuilder::new(&snapshot);
        let views = snapshot
            .list_contents()?
            .into_iter()
            .map(|content| builder.content_view(content))
            .collect::<Result<Vec<_>>>()?;
        Ok(views)
    }

    /// One content with its files.
    pub fn content_view(&self, content_id: u64) -> Result<ContentView> {
        let content = self.get_content(content_id)?;
        let files = self.storage.list_attachments(content_id)?;
        Ok(ContentView { content, files })
    }

    /// Ratings of every channel under one snapshot, in id order.
    pub fn channel_ratings(&self) -> Result<Vec<(Channel, Option<f64>)>> {
        let snapshot = self.storage.snapshot();
        let mut ratings = RatingAggregator::new(&snapshot);
        let rated = snapshot
            .list_channels()?
            .into_iter()
            .map(|channel| -> Result<(Channel, Option<f64>)> {
                let average = ratings.rate(&channel)?;
                Ok((channel, average))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(rated)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::catalog;
    use super::*;
    use serde_json::json;

    /// Two groups, three tagged channels, one untagged.
    fn seeded() -> (tempfile::TempDir, Catalog) {
        let (dir, catalog) = catalog();
        let g1 = catalog.create_group("Group 1").unwrap();
        let g2 = catalog.create_group("Group 2").unwrap();
        let content = catalog.create_content("C", json!({}), Some(5.0)).unwrap();

        for (title, groups) in [
            ("Channel 1", vec![g1.id]),
            ("Channel 2", vec![g2.id]),
            ("Channel 3", vec![g1.id, g2.id]),
            ("Channel 4", vec![]),
        ] {
            let channel = catalog.create_channel(title, "EN").unwrap();
            catalog.set_contents(channel.id, [content.id]).unwrap();
            catalog.set_groups(channel.id, groups).unwrap();
        }
        (dir, catalog)
    }

    fn titles(channels: &[Channel]) -> Vec<&str> {
        channels.iter().map(|c| c.title.as_str()).collect()
    }

    #[test]
    fn no_filter_lists_all() {
        let (_dir, catalog) = seeded();
        let all = catalog.list_channels(&ChannelFilter::default()).unwrap();
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn filter_by_group_id() {
        let (_dir, catalog) = seeded();
        let channels = catalog.list_channels(&ChannelFilter::by_group_id(2)).unwrap();
        assert_eq!(titles(&channels), vec!["Channel 2", "Channel 3"]);
    }

    #[test]
    fn filter_by_group_name_is_exact() {
        let (_dir, catalog) = seeded();
        let channels = catalog
            .list_channels(&ChannelFilter::by_group_name("Group 1"))
            .unwrap();
        assert_eq!(titles(&channels), vec!["Channel 1", "Channel 3"]);

        let none = catalog
            .list_channels(&ChannelFilter::by_group_name("group 1"))
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn filters_combine() {
        let (_dir, catalog) = seeded();
        let filter = ChannelFilter {
            group_id: Some(2),
            group_name: Some("Group 1".into()),
        };
        let channels = catalog.list_channels(&filter).unwrap();
        assert_eq!(titles(&channels), vec!["Channel 3"]);
    }

    #[test]
    fn channel_view_expands_tree() {
        let (_dir, catalog) = catalog();
        let content = catalog.create_content("C", json!({}), Some(8.5)).unwrap();
        catalog.attach_file(content.id, "file.mp4").unwrap();
        let leaf = catalog.create_channel("Leaf", "EN").unwrap();
        catalog.set_contents(leaf.id, [content.id]).unwrap();
        let root = catalog.create_channel("Root", "EN").unwrap();
        catalog.set_subchannels(root.id, [leaf.id]).unwrap();

        let view = catalog.channel_view(root.id).unwrap();
        assert_eq!(view.average_rating, Some(8.5));
        assert!(view.contents.is_empty());
        assert_eq!(view.subchannels.len(), 1);
        assert_eq!(view.subchannels[0].title, "Leaf");
        assert_eq!(view.subchannels[0].contents[0].files.len(), 1);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["subchannels"][0]["contents"][0]["title"], "C");
        assert_eq!(json["subchannels"][0]["contents"][0]["rating"], json!(8.5));
    }

    #[test]
    fn content_views_include_files() {
        let (_dir, catalog) = catalog();
        let content = catalog.create_content("C", json!({}), None).unwrap();
        catalog.attach_file(content.id, "notes.txt").unwrap();

        let views = catalog.content_views().unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].files[0].file_name, "notes.txt");
        assert_eq!(catalog.content_view(content.id).unwrap(), views[0]);
    }

    #[test]
    fn channel_ratings_cover_every_channel() {
        let (_dir, catalog) = seeded();
        let ratings = catalog.channel_ratings().unwrap();
        assert_eq!(ratings.len(), 4);
        assert!(ratings.iter().all(|(_, rating)| *rating == Some(5.0)));
    }
}
