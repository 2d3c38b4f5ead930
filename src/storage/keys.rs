//! Object key generation and recovery from public URLs.
//!
//! Stored records keep only the public URL of their image, so deleting the
//! object later means parsing its key back out of that URL. The parsing
//! contract is pinned here:
//!
//! - Project images live at the bucket root under `"<uuid>-<file name>"`; the
//!   key is the **last** path segment of the URL ([`object_name_of`]).
//! - Site content images live under `"about/<uuid>.<ext>"`; the key is the
//!   **last two** path segments of the URL ([`storage_key_of`]).
//!
//! Both assume the public URL ends with the key verbatim (no percent-encoding,
//! which [`sanitize_file_name`] guarantees for keys generated here). Query
//! strings and fragments are ignored.

use uuid::Uuid;

/// Folder inside the content bucket holding about-section images.
pub const CONTENT_IMAGE_FOLDER: &str = "about";

/// Builds a globally unique key for a project image.
///
/// # Examples
///
/// ```
/// use folio::storage::keys::project_object_key;
///
/// let key = project_object_key("My Photo.png");
/// assert!(key.ends_with("-My-Photo.png"));
/// assert_ne!(key, project_object_key("My Photo.png"));
/// ```
#[must_use]
pub fn project_object_key(file_name: &str) -> String {
    format!("{}-{}", Uuid::new_v4(), sanitize_file_name(file_name))
}

/// Builds a fresh key for a site content image.
#[must_use]
pub fn content_object_key(extension: Option<&str>) -> String {
    let id = Uuid::new_v4();
    match extension.map(sanitize_file_name).filter(|ext| !ext.is_empty()) {
        Some(ext) => format!("{CONTENT_IMAGE_FOLDER}/{id}.{ext}"),
        None => format!("{CONTENT_IMAGE_FOLDER}/{id}"),
    }
}

/// Replaces every character outside `[A-Za-z0-9._-]` with `-`.
///
/// Path separators are replaced too, so the result is always a single segment.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '-' })
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

/// Storage key of a site content image: the last two path segments of its URL.
///
/// Returns `None` when the URL path has fewer than two segments.
///
/// # Examples
///
/// ```
/// use folio::storage::keys::storage_key_of;
///
/// let url = "https://x.supabase.co/storage/v1/object/public/site-images/about/42.png?t=1";
/// assert_eq!(storage_key_of(url).as_deref(), Some("about/42.png"));
/// assert_eq!(storage_key_of("https://x.supabase.co/42.png"), None);
/// ```
#[must_use]
pub fn storage_key_of(url: &str) -> Option<String> {
    let segments = path_segments(url);
    match segments.as_slice() {
        [.., folder, name] => Some(format!("{folder}/{name}")),
        _ => None,
    }
}

/// Storage key of a project image: the last path segment of its URL.
///
/// # Examples
///
/// ```
/// use folio::storage::keys::object_name_of;
///
/// let url = "https://x.supabase.co/storage/v1/object/public/project-images/9f-img.png";
/// assert_eq!(object_name_of(url).as_deref(), Some("9f-img.png"));
/// assert_eq!(object_name_of("https://x.supabase.co/"), None);
/// ```
#[must_use]
pub fn object_name_of(url: &str) -> Option<String> {
    path_segments(url).last().map(|s| (*s).to_string())
}

/// Non-empty path segments of a URL, host excluded.
fn path_segments(url: &str) -> Vec<&str> {
    let without_fragment = url.split('#').next().unwrap_or(url);
    let without_query = without_fragment.split('?').next().unwrap_or(without_fragment);

    let path = match without_query.split_once("://") {
        Some((_scheme, rest)) => rest.find('/').map_or("", |idx| &rest[idx..]),
        None => without_query,
    };

    path.split('/').filter(|segment| !segment.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_key_lives_in_about_folder() {
        let key = content_object_key(Some("webp"));
        assert!(key.starts_with("about/"));
        assert!(key.ends_with(".webp"));
        assert!(!content_object_key(None).contains('.'));
    }

    #[test]
    fn generated_keys_round_trip_through_public_urls() {
        let base = "https://x.supabase.co/storage/v1/object/public";

        let project_key = project_object_key("img.png");
        let url = format!("{base}/project-images/{project_key}");
        assert_eq!(object_name_of(&url), Some(project_key));

        let content_key = content_object_key(Some("png"));
        let url = format!("{base}/site-images/{content_key}");
        assert_eq!(storage_key_of(&url), Some(content_key));
    }

    #[test]
    fn sanitizing_removes_separators() {
        assert_eq!(sanitize_file_name("../etc/passwd"), "..-etc-passwd");
        assert_eq!(sanitize_file_name("résumé final.pdf"), "r-sum--final.pdf");
        assert_eq!(sanitize_file_name(".."), "file");
        assert_eq!(sanitize_file_name(""), "file");
    }

    #[test]
    fn file_urls_and_bare_paths_parse() {
        let url = "file:///tmp/folio/objects/site-images/about/a.png";
        assert_eq!(storage_key_of(url).as_deref(), Some("about/a.png"));
        assert_eq!(object_name_of("/project-images/k.png#top").as_deref(), Some("k.png"));
    }

    #[test]
    fn host_only_urls_have_no_key() {
        assert_eq!(object_name_of("https://cdn.example"), None);
        assert_eq!(storage_key_of("https://cdn.example/one"), None);
    }
}
