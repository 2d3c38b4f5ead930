//! Contact form submissions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{FolioError, Result};

/// A message left through the public contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    #[serde(deserialize_with = "super::id::opaque_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// A contact form submission before it is stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl NewMessage {
    pub fn new(name: impl Into<String>, email: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    /// Checks the submission before it is sent anywhere.
    ///
    /// # Errors
    ///
    /// Returns [`FolioError::Validation`] if the name or body is blank, or the
    /// email address has no `@` with text on both sides.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(FolioError::Validation("name must not be empty".into()));
        }
        if self.message.trim().is_empty() {
            return Err(FolioError::Validation("message must not be empty".into()));
        }
        match self.email.trim().split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
            _ => Err(FolioError::Validation(format!(
                "invalid email address: {}",
                self.email
            ))),
        }
    }
}
