//! Site content singleton.
//!
//! The editable copy of the site (hero, about section, social links, skill
//! selection) lives in a single remote row. The row's identifier is fixed at
//! compile time and never exposed for change.

use serde::{Deserialize, Serialize};

use super::skills::{resolve_skills, Skill};

/// Identifier of the one and only site content row.
pub const SITE_CONTENT_ID: i64 = 1;

/// Editable site copy.
///
/// Saved wholesale: every save replaces the complete record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteContent {
    pub hero_title: String,
    pub hero_subtitle: String,
    pub hero_description: String,
    /// Public URL of the profile image shown in the about section.
    pub about_image: String,
    pub about_p1: String,
    pub about_p2: String,
    pub about_p3: String,
    pub github_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub twitter_url: Option<String>,
    /// Selected skill names, cross-referenced against the skill catalog.
    pub skills: Vec<String>,
}

/// A configured social profile link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SocialLink<'a> {
    pub name: &'static str,
    pub url: &'a str,
}

impl SiteContent {
    /// Returns the about image URL, or `None` if no image was ever set.
    #[must_use]
    pub fn about_image_url(&self) -> Option<&str> {
        Some(self.about_image.trim()).filter(|url| !url.is_empty())
    }

    /// Social links that have a non-empty URL, in display order.
    ///
    /// # Examples
    ///
    /// ```
    /// use folio::domain::SiteContent;
    ///
    /// let content = SiteContent {
    ///     github_url: Some("https://github.com/someone".into()),
    ///     twitter_url: Some("  ".into()),
    ///     ..Default::default()
    /// };
    /// let links = content.social_links();
    /// assert_eq!(links.len(), 1);
    /// assert_eq!(links[0].name, "GitHub");
    /// ```
    #[must_use]
    pub fn social_links(&self) -> Vec<SocialLink<'_>> {
        [
            ("GitHub", &self.github_url),
            ("LinkedIn", &self.linkedin_url),
            ("Twitter", &self.twitter_url),
        ]
        .into_iter()
        .filter_map(|(name, url)| {
            url.as_deref()
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(|url| SocialLink { name, url })
        })
        .collect()
    }

    /// Catalog entries for the selected skills.
    #[must_use]
    pub fn selected_skills(&self) -> Vec<&'static Skill> {
        resolve_skills(&self.skills)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_decode_to_defaults() {
        let content: SiteContent = serde_json::from_value(serde_json::json!({
            "id": SITE_CONTENT_ID,
            "hero_title": "Hello"
        }))
        .unwrap();

        assert_eq!(content.hero_title, "Hello");
        assert!(content.about_image_url().is_none());
        assert!(content.skills.is_empty());
    }

    #[test]
    fn selected_skills_follow_catalog() {
        let content = SiteContent {
            skills: vec!["Docker".into(), "React".into(), "COBOL".into()],
            ..Default::default()
        };
        let names: Vec<_> = content.selected_skills().iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["React", "Docker"]);
    }
}
