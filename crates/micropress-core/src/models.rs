//! Data model shared by the upload and publish flows.

use crate::error::{Error, ErrorKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// One embedded image reference found in a note, e.g. `![[photo.png]]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmbeddedReference {
    /// The full token as written in the text
    pub raw_token: String,
    /// The filename inside the token
    pub filename: String,
}

impl EmbeddedReference {
    /// Build a reference for a filename, reconstructing its canonical token
    pub fn new(filename: impl Into<String>) -> Self {
        let filename = filename.into();
        Self {
            raw_token: format!("![[{}]]", filename),
            filename,
        }
    }
}

/// A file known to a [`crate::FileStore`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileEntry {
    /// Path relative to the store root
    pub path: PathBuf,
}

impl FileEntry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Final path component, e.g. `photo.png`
    pub fn name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    /// Extension without the dot
    pub fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|e| e.to_str())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Outcome of processing one referenced image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub filename: String,
    /// Location returned by the media endpoint
    pub remote_location: Option<String>,
    /// Description used in the rewritten link (fallback text on failure)
    pub description: String,
    pub succeeded: bool,
    pub error: Option<ErrorKind>,
    /// Rendered error message, if any
    pub message: Option<String>,
    /// Whether the local copy was deleted after upload
    pub deleted: bool,
}

impl UploadResult {
    /// A successful upload
    pub fn uploaded(
        filename: impl Into<String>,
        location: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            remote_location: Some(location.into()),
            description: description.into(),
            succeeded: true,
            error: None,
            message: None,
            deleted: false,
        }
    }

    /// A failed item
    pub fn failed(filename: impl Into<String>, description: impl Into<String>, err: &Error) -> Self {
        Self {
            filename: filename.into(),
            remote_location: None,
            description: description.into(),
            succeeded: false,
            error: Some(err.kind()),
            message: Some(err.to_string()),
            deleted: false,
        }
    }
}

/// Response of a successful publish
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishOutcome {
    pub url: String,
    pub preview: String,
}

/// Post visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Draft,
    Published,
}

impl Visibility {
    /// Value sent as `post-status`
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Draft => "draft",
            Visibility::Published => "published",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(Visibility::Draft),
            "published" => Ok(Visibility::Published),
            other => Err(Error::validation_error(format!(
                "Unknown visibility '{}' (expected draft or published)",
                other
            ))),
        }
    }
}

/// Ordered, de-duplicated list of tags.
///
/// Parsed from comma-separated text; entries are trimmed, blanks dropped,
/// and exact duplicates removed keeping the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagList {
    tags: Vec<String>,
}

impl TagList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse comma-separated text
    pub fn parse(text: &str) -> Self {
        let mut list = Self::new();
        for tag in text.split(',') {
            list.insert(tag);
        }
        list
    }

    /// Append a tag unless it is blank or already present.
    ///
    /// Returns whether the list changed.
    pub fn insert(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.contains(tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    pub fn contains(&self, tag: &str) -> bool {
        let tag = tag.trim();
        self.tags.iter().any(|t| t == tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.tags.clone()
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = Self::new();
        for tag in iter {
            list.insert(tag.as_ref());
        }
        list
    }
}

impl fmt::Display for TagList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tags.join(","))
    }
}
