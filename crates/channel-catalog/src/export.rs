//! Ranked channel rating export.
//!
//! Writes every rated channel as `channel_title,average_rating`, highest
//! rating first. Channels without a rating are left out.

use crate::catalog::Catalog;
use crate::error::Result;
use serde::{Serialize, Serializer};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Default output file name.
pub const DEFAULT_EXPORT_FILE: &str = "channel_ratings.csv";

const HEADER: [&str; 2] = ["channel_title", "average_rating"];

/// One exported row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelRating {
    #[serde(skip)]
    pub channel_id: u64,
    #[serde(rename = "channel_title")]
    pub title: String,
    #[serde(rename = "average_rating", serialize_with = "two_decimals")]
    pub rating: f64,
}

fn two_decimals<S: Serializer>(rating: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(&format_args!("{:.2}", rating))
}

impl Catalog {
    /// Rated channels, highest first. Ties keep ascending id order.
    pub fn ranked_ratings(&self) -> Result<Vec<ChannelRating>> {
        let mut ranked: Vec<ChannelRating> = self
            .channel_ratings()?
            .into_iter()
            .filter_map(|(channel, rating)| {
                rating.map(|rating| ChannelRating {
                    channel_id: channel.id,
                    title: channel.title,
                    rating,
                })
            })
            .collect();
        ranked.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        Ok(ranked)
    }

    /// Write the ranked export to `out`. Returns the number of rows written.
    pub fn export_ratings<W: Write>(&self, out: W) -> Result<usize> {
        let ranked = self.ranked_ratings()?;
        write_ratings(&ranked, out)?;
        Ok(ranked.len())
    }

    /// Write the ranked export to a file, replacing it if present.
    pub fn export_ratings_to_path<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let path = path.as_ref();
        let rows = self.export_ratings(File::create(path)?)?;
        tracing::info!(rows, path = %path.display(), "Exported channel ratings");
        Ok(rows)
    }
}

/// Write rows as CSV with a header row and CRLF line endings.
///
/// The header is written even when there are no rows.
pub fn write_ratings<W: Write>(rows: &[ChannelRating], out: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::CRLF)
        .from_writer(out);
    writer.write_record(HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
