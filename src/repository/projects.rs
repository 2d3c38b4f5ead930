//! Project list synchronization.
//!
//! [`ProjectRepository`] owns the cached list of portfolio projects and the
//! sequencing of image uploads around record writes:
//!
//! ```text
//! add:    upload image ──► resolve public URL ──► insert record ──► prepend to cache
//!              │ fails: abort          insert fails: remove uploaded image (best effort)
//!
//! delete: delete record ──► remove image (best effort) ──► drop from cache
//!              │ fails: abort, cache untouched
//! ```

use std::sync::Arc;

use tracing::{debug, error, warn};

use super::{decode_row, decode_rows, Cache, SyncState};
use crate::domain::error::Result;
use crate::domain::{ImageFile, NewProject, Project};
use crate::storage::keys::{object_name_of, project_object_key};
use crate::storage::models::{to_row, ProjectInsert};
use crate::storage::backend::row_id;
use crate::storage::{Order, RemoteStore};

/// Cached, store-backed list of projects, newest first.
pub struct ProjectRepository {
    store: Arc<dyn RemoteStore>,
    table: String,
    bucket: String,
    cache: Cache<Vec<Project>>,
    state: SyncState,
}

impl std::fmt::Debug for ProjectRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectRepository")
            .field("table", &self.table)
            .field("bucket", &self.bucket)
            .field("cached", &self.cache.read().len())
            .field("state", &self.state)
            .finish()
    }
}

impl ProjectRepository {
    /// Creates a repository over `table`, storing images in `bucket`.
    ///
    /// The repository starts in the loading state with an empty cache.
    pub fn new(store: Arc<dyn RemoteStore>, table: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
            bucket: bucket.into(),
            cache: Cache::new(Vec::new()),
            state: SyncState::new(),
        }
    }

    /// Fetches all projects, newest first, and replaces the cache.
    ///
    /// Never fails: a store error is logged and leaves the cache empty. The
    /// loading flag stays set until the fetch resolves either way. A fetch
    /// that was in flight when the repository was unmounted returns an empty
    /// list and leaves both the cache and the loading flag alone.
    #[tracing::instrument(skip(self), fields(table = %self.table))]
    pub async fn list(&self) -> Vec<Project> {
        let generation = self.state.begin_fetch();

        let fetched = match self.store.select(&self.table, Some(&Order::newest_first())).await {
            Ok(rows) => decode_rows::<Project>(rows),
            Err(e) => Err(e),
        };

        if !self.state.finish_fetch(generation) {
            debug!("repository unmounted since fetch started, discarding fetched projects");
            return Vec::new();
        }

        match fetched {
            Ok(projects) => {
                debug!(count = projects.len(), "projects loaded");
                *self.cache.write() = projects;
            }
            Err(e) => {
                error!(error = %e, "failed to load projects");
                self.cache.write().clear();
            }
        }

        self.projects()
    }

    /// Uploads `image`, inserts the project, and prepends it to the cache.
    ///
    /// The cache receives the row returned by the store, so server-assigned
    /// fields (`id`, `created_at`, `views`) are authoritative. Nothing is
    /// cached before the insert is confirmed.
    ///
    /// Concurrent calls are not coordinated; each uploads and inserts on its
    /// own.
    ///
    /// # Errors
    ///
    /// - Upload failure: returned as-is, no record is inserted.
    /// - Insert failure: the uploaded object is removed (best effort) and the
    ///   insert error is returned.
    /// - Undecodable inserted row: the record and the uploaded object are
    ///   removed (best effort) and the decode error is returned, so a failed
    ///   call never leaves a project behind.
    #[tracing::instrument(skip(self, project, image), fields(title = %project.title, file = %image.file_name))]
    pub async fn add(&self, project: NewProject, image: ImageFile) -> Result<Project> {
        let generation = self.state.generation();
        let key = project_object_key(&image.file_name);
        let image_url = self.store.public_url(&self.bucket, &key);
        let row = to_row(&ProjectInsert {
            fields: &project,
            image_url: &image_url,
        })?;

        if let Err(e) = self
            .store
            .upload_object(&self.bucket, &key, image.bytes, &image.content_type)
            .await
        {
            error!(error = %e, key = %key, "image upload failed, project not created");
            return Err(e);
        }
        debug!(key = %key, url = %image_url, "image uploaded");

        let inserted = match self.store.insert(&self.table, row).await {
            Ok(row) => row,
            Err(e) => {
                error!(error = %e, "project insert failed, removing uploaded image");
                self.remove_image_key(&key).await;
                return Err(e);
            }
        };

        let created: Project = match decode_row(inserted.clone()) {
            Ok(created) => created,
            Err(e) => {
                error!(error = %e, "inserted project row could not be decoded, rolling back");
                self.roll_back_insert(&inserted, &key).await;
                return Err(e);
            }
        };
        debug!(project_id = %created.id, "project created");

        if self.state.is_current(generation) {
            self.cache.write().insert(0, created.clone());
        } else {
            debug!("repository unmounted, not caching created project");
        }

        Ok(created)
    }

    /// Deletes a cached project and its image.
    ///
    /// Ids not present in the cache are a no-op. The image is removed only
    /// after the record delete succeeded, and its removal failing is logged
    /// without affecting the result.
    ///
    /// # Errors
    ///
    /// Returns the record delete error; the cache is left untouched.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        let generation = self.state.generation();
        let Some(project) = self.get(id) else {
            debug!("project not cached, nothing to delete");
            return Ok(());
        };

        if let Err(e) = self.store.delete(&self.table, id).await {
            error!(error = %e, "project delete failed");
            return Err(e);
        }

        self.remove_image_url(&project.image_url).await;

        if self.state.is_current(generation) {
            self.cache.write().retain(|p| p.id != id);
        }
        debug!("project deleted");
        Ok(())
    }

    /// Snapshot of the cached projects, newest first.
    #[must_use]
    pub fn projects(&self) -> Vec<Project> {
        self.cache.read().clone()
    }

    /// Cached project by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Project> {
        self.cache.read().iter().find(|p| p.id == id).cloned()
    }

    /// `true` until the current fetch resolves.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    /// Stops applying results to the cache. Operations in flight now stay
    /// discarded even after a later [`mount`](Self::mount).
    pub fn unmount(&self) {
        self.state.unmount();
    }

    /// Resumes applying results of operations started from now on.
    pub fn mount(&self) {
        self.state.mount();
    }

    async fn roll_back_insert(&self, inserted: &serde_json::Value, key: &str) {
        match row_id(inserted) {
            Some(id) => {
                if let Err(e) = self.store.delete(&self.table, &id).await {
                    warn!(error = %e, project_id = %id, "failed to delete undecodable project row");
                }
            }
            None => warn!("inserted project row has no id, leaving it in place"),
        }
        self.remove_image_key(key).await;
    }

    async fn remove_image_url(&self, url: &str) {
        let bucket_prefix = self.store.public_url(&self.bucket, "");
        if !url.starts_with(&bucket_prefix) {
            debug!(url = %url, "image not served from project bucket, skipping removal");
            return;
        }
        match object_name_of(url) {
            Some(key) => self.remove_image_key(&key).await,
            None => warn!(url = %url, "could not derive storage key from image URL"),
        }
    }

    async fn remove_image_key(&self, key: &str) {
        if let Err(e) = self.store.remove_objects(&self.bucket, &[key.to_string()]).await {
            warn!(error = %e, key = %key, "failed to remove project image");
        } else {
            debug!(key = %key, "project image removed");
        }
    }
}
