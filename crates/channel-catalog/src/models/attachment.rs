//! File attachments on content.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Extensions accepted for attached files (compared case-insensitively).
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "mov", "avi", "mp4", "webm", "mkv", "pdf", "doc", "docx", "txt",
];

/// A file attached to a content.
///
/// Kept as its own record so attaching never rewrites the content itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attachment {
    /// Store-assigned identifier
    pub id: u64,

    /// Owning content
    pub content_id: u64,

    /// Stored file name
    pub file_name: String,
}

impl Attachment {
    /// Create an attachment, rejecting disallowed extensions.
    pub fn new(id: u64, content_id: u64, file_name: String) -> Result<Self> {
        validate_file_name(&file_name)?;
        Ok(Self {
            id,
            content_id,
            file_name,
        })
    }

    /// Lowercased extension of the file name.
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.file_name)
    }

    /// MIME type guessed from the extension.
    pub fn file_type(&self) -> &'static str {
        match self.extension().as_deref() {
            Some("mov") => "video/quicktime",
            Some("avi") => "video/x-msvideo",
            Some("mp4") => "video/mp4",
            Some("webm") => "video/webm",
            Some("mkv") => "video/x-matroska",
            Some("pdf") => "application/pdf",
            Some("doc") => "application/msword",
            Some("docx") => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Some("txt") => "text/plain",
            _ => "Unknown file type",
        }
    }
}

fn extension_of(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Check a file name against [`ALLOWED_EXTENSIONS`].
pub fn validate_file_name(file_name: &str) -> Result<()> {
    match extension_of(file_name) {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        Some(ext) => Err(Error::InvalidInput(format!(
            "file extension \"{}\" is not allowed (allowed: {})",
            ext,
            ALLOWED_EXTENSIONS.join(", ")
        ))),
        None => Err(Error::InvalidInput(format!(
            "file name \"{}\" has no extension",
            file_name
        ))),
    }
}
