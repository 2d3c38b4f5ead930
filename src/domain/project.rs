//! Portfolio project domain model.
//!
//! A [`Project`] is a showcased piece of work: title, description, tags, an
//! image hosted in object storage, and optional links to a live deployment and
//! to the source. Identifier, creation time, and view counter are assigned and
//! maintained by the remote store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A portfolio project as stored remotely.
///
/// `image_url` is never empty for a persisted project: creating a project
/// requires an uploaded image and the record stores its public URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(deserialize_with = "super::id::opaque_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub live_url: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub views: u64,
}

impl Project {
    /// Returns `true` if the project carries the given tag (case-insensitive).
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Caller-supplied fields for a new project.
///
/// The image is passed separately as an [`ImageFile`]; its public URL is
/// resolved after upload and added to the inserted record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub live_url: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
}

impl NewProject {
    /// Creates a project draft with title, description, and tags.
    ///
    /// # Examples
    ///
    /// ```
    /// use folio::domain::NewProject;
    ///
    /// let draft = NewProject::new("X", "Y", ["a", "b"]);
    /// assert_eq!(draft.tags, vec!["a", "b"]);
    /// assert!(draft.live_url.is_none());
    /// ```
    pub fn new<I, T>(title: impl Into<String>, description: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            title: title.into(),
            description: description.into(),
            tags: tags.into_iter().map(Into::into).collect(),
            live_url: None,
            source_url: None,
        }
    }

    #[must_use]
    pub fn with_live_url(mut self, url: impl Into<String>) -> Self {
        self.live_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }
}

/// An image selected for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// Original file name as picked by the user.
    pub file_name: String,
    /// MIME type sent with the upload.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    /// Creates an image file, inferring the content type from the extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use folio::domain::ImageFile;
    ///
    /// let image = ImageFile::new("img.png", vec![0x89, b'P', b'N', b'G']);
    /// assert_eq!(image.content_type, "image/png");
    /// assert_eq!(image.extension().as_deref(), Some("png"));
    /// ```
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    /// Lowercased file extension, if any.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
    }
}

impl std::fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn content_type_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("avif") => "image/avif",
        _ => "application/octet-stream",
    }
}

/// Splits comma-separated tag input into trimmed, non-empty tags.
///
/// # Examples
///
/// ```
/// use folio::domain::parse_tags;
///
/// assert_eq!(parse_tags(" React, Rust ,,Tailwind CSS,"), vec!["React", "Rust", "Tailwind CSS"]);
/// assert!(parse_tags(" , ").is_empty());
/// ```
#[must_use]
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(String::from)
        .collect()
}
