//! Row payloads sent to the remote store.
//!
//! These types describe what the repositories write, separate from the domain
//! models they read back. Server-assigned columns (`id`, `created_at`,
//! `views`) are deliberately absent from insert payloads.

use serde::Serialize;
use serde_json::Value;

use crate::domain::error::Result;
use crate::domain::{NewMessage, NewProject, SiteContent, SITE_CONTENT_ID};

/// Insert payload for a new project row.
#[derive(Debug, Serialize)]
pub struct ProjectInsert<'a> {
    #[serde(flatten)]
    pub fields: &'a NewProject,
    pub image_url: &'a str,
}

/// Upsert payload for the site content singleton.
///
/// Always carries [`SITE_CONTENT_ID`], so every save targets the same row.
#[derive(Debug, Serialize)]
pub struct SiteContentRow<'a> {
    id: i64,
    #[serde(flatten)]
    content: &'a SiteContent,
}

impl<'a> SiteContentRow<'a> {
    #[must_use]
    pub const fn new(content: &'a SiteContent) -> Self {
        Self {
            id: SITE_CONTENT_ID,
            content,
        }
    }
}

/// Insert payload for a contact form submission.
#[derive(Debug, Serialize)]
pub struct MessageInsert<'a> {
    #[serde(flatten)]
    pub fields: &'a NewMessage,
}

/// Serializes a payload into the JSON row handed to a [`RemoteStore`](super::RemoteStore).
///
/// # Errors
///
/// Returns [`FolioError::Serialization`](crate::FolioError::Serialization) if
/// the payload cannot be encoded.
pub fn to_row<T: Serialize>(payload: &T) -> Result<Value> {
    Ok(serde_json::to_value(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn project_insert_flattens_fields() {
        let draft = NewProject::new("X", "Y", ["a", "b"]);
        let row = to_row(&ProjectInsert { fields: &draft, image_url: "https://cdn/k.png" }).unwrap();

        assert_eq!(row["title"], "X");
        assert_eq!(row["tags"], json!(["a", "b"]));
        assert_eq!(row["image_url"], "https://cdn/k.png");
        assert!(row.get("id").is_none());
        assert!(row.get("created_at").is_none());
    }

    #[test]
    fn content_row_pins_singleton_id() {
        let content = SiteContent { hero_title: "Hi".into(), ..Default::default() };
        let row = to_row(&SiteContentRow::new(&content)).unwrap();

        assert_eq!(row["id"], json!(SITE_CONTENT_ID));
        assert_eq!(row["hero_title"], "Hi");
    }
}
