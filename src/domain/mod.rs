//! Domain layer for the portfolio synchronization core.
//!
//! This module contains the record types the site is built from, independent of
//! the remote store or of any presentation concerns.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`project`]: Portfolio projects and image uploads
//! - [`content`]: The site content singleton
//! - `id`: Text-or-integer record ids
//! - [`message`]: Contact form submissions
//! - [`skills`]: Static skill catalog

pub mod content;
pub mod error;
pub(crate) mod id;
pub mod message;
pub mod project;
pub mod skills;

pub use content::{SiteContent, SocialLink, SITE_CONTENT_ID};
pub use error::{FolioError, Result};
pub use message::{ContactMessage, NewMessage};
pub use project::{parse_tags, ImageFile, NewProject, Project};
pub use skills::{Skill, SKILL_CATALOG};
