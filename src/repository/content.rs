//! Site content synchronization.
//!
//! [`SiteContentRepository`] mirrors the single site content row. "No row yet"
//! is a normal state, represented as `None`, and distinct from a row whose
//! fields are empty. Saves are full-record upserts keyed by
//! [`SITE_CONTENT_ID`], so the first save creates the row and later saves
//! replace it; there is no separate create path.

use std::sync::Arc;

use tracing::{debug, error, warn};

use super::{decode_row, Cache, SyncState};
use crate::domain::error::Result;
use crate::domain::{ImageFile, SiteContent, SITE_CONTENT_ID};
use crate::storage::keys::{content_object_key, storage_key_of};
use crate::storage::models::{to_row, SiteContentRow};
use crate::storage::RemoteStore;

/// Cached, store-backed site content singleton.
pub struct SiteContentRepository {
    store: Arc<dyn RemoteStore>,
    table: String,
    bucket: String,
    cache: Cache<Option<SiteContent>>,
    state: SyncState,
}

impl std::fmt::Debug for SiteContentRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteContentRepository")
            .field("table", &self.table)
            .field("bucket", &self.bucket)
            .field("has_content", &self.cache.read().is_some())
            .field("state", &self.state)
            .finish()
    }
}

impl SiteContentRepository {
    pub fn new(store: Arc<dyn RemoteStore>, table: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
            bucket: bucket.into(),
            cache: Cache::new(None),
            state: SyncState::new(),
        }
    }

    /// Fetches the singleton row into the cache.
    ///
    /// A missing row yields `None` as a normal outcome. A query error also
    /// yields `None`, but is logged.
    #[tracing::instrument(skip(self), fields(table = %self.table))]
    pub async fn fetch(&self) -> Option<SiteContent> {
        let generation = self.state.begin_fetch();

        let fetched = match self.store.select_by_id(&self.table, &SITE_CONTENT_ID.to_string()).await {
            Ok(Some(row)) => decode_row::<SiteContent>(row).map(Some),
            Ok(None) => Ok(None),
            Err(e) => Err(e),
        };

        if !self.state.finish_fetch(generation) {
            debug!("repository unmounted since fetch started, discarding fetched content");
            return None;
        }

        let content = match fetched {
            Ok(Some(content)) => {
                debug!("site content loaded");
                Some(content)
            }
            Ok(None) => {
                debug!("no site content row yet");
                None
            }
            Err(e) => {
                error!(error = %e, "failed to load site content");
                None
            }
        };

        *self.cache.write() = content.clone();
        content
    }

    /// Saves `content` as the complete site content record.
    ///
    /// With an image, the previous about image (if any, and if it lives in
    /// the content bucket) is removed first on a best-effort basis, then the
    /// new image is uploaded under a fresh key and `about_image` is pointed at
    /// it. The record is then upserted and the cache replaced with the row the
    /// store returned.
    ///
    /// # Errors
    ///
    /// - Upload failure aborts the save before any record write.
    /// - Upsert failure is returned with the cache unchanged; a freshly
    ///   uploaded image is removed again (best effort).
    #[tracing::instrument(skip(self, content, image), fields(with_image = image.is_some()))]
    pub async fn update(&self, content: SiteContent, image: Option<ImageFile>) -> Result<SiteContent> {
        let generation = self.state.generation();
        let mut content = content;
        let mut uploaded_key = None;

        if let Some(image) = image {
            let previous = self
                .content()
                .and_then(|cached| cached.about_image_url().map(String::from))
                .or_else(|| content.about_image_url().map(String::from));

            if let Some(previous) = previous {
                self.remove_previous_image(&previous).await;
            }

            let key = content_object_key(image.extension().as_deref());
            if let Err(e) = self
                .store
                .upload_object(&self.bucket, &key, image.bytes, &image.content_type)
                .await
            {
                error!(error = %e, key = %key, "about image upload failed, content not saved");
                return Err(e);
            }

            content.about_image = self.store.public_url(&self.bucket, &key);
            debug!(key = %key, url = %content.about_image, "about image uploaded");
            uploaded_key = Some(key);
        }

        let row = to_row(&SiteContentRow::new(&content))?;
        let saved = match self.store.upsert(&self.table, row).await {
            Ok(row) => row,
            Err(e) => {
                error!(error = %e, "site content upsert failed");
                if let Some(key) = uploaded_key {
                    self.remove_key(&key).await;
                }
                return Err(e);
            }
        };

        let saved: SiteContent = decode_row(saved)?;
        if self.state.is_current(generation) {
            *self.cache.write() = Some(saved.clone());
        } else {
            debug!("repository unmounted, not caching saved content");
        }

        debug!("site content saved");
        Ok(saved)
    }

    /// Cached content; `None` if no row exists (or nothing was fetched yet).
    #[must_use]
    pub fn content(&self) -> Option<SiteContent> {
        self.cache.read().clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn unmount(&self) {
        self.state.unmount();
    }

    pub fn mount(&self) {
        self.state.mount();
    }

    async fn remove_previous_image(&self, url: &str) {
        let bucket_prefix = self.store.public_url(&self.bucket, "");
        if !url.starts_with(&bucket_prefix) {
            debug!(url = %url, "previous image not served from content bucket, leaving it");
            return;
        }
        match storage_key_of(url) {
            Some(key) => self.remove_key(&key).await,
            None => warn!(url = %url, "could not derive storage key from previous image URL"),
        }
    }

    async fn remove_key(&self, key: &str) {
        if let Err(e) = self.store.remove_objects(&self.bucket, &[key.to_string()]).await {
            warn!(error = %e, key = %key, "failed to remove about image");
        } else {
            debug!(key = %key, "about image removed");
        }
    }
}
