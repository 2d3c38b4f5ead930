//! Contact message inbox.

use std::sync::Arc;

use tracing::{debug, error};

use super::{decode_row, decode_rows, Cache, SyncState};
use crate::domain::error::Result;
use crate::domain::{ContactMessage, NewMessage};
use crate::storage::models::{to_row, MessageInsert};
use crate::storage::{Order, RemoteStore};

/// Cached, store-backed list of contact messages, newest first.
///
/// Reading and deleting happen from the admin dashboard. [`submit`] serves
/// the public contact form and does not touch the cache.
///
/// [`submit`]: MessageRepository::submit
pub struct MessageRepository {
    store: Arc<dyn RemoteStore>,
    table: String,
    cache: Cache<Vec<ContactMessage>>,
    state: SyncState,
}

impl std::fmt::Debug for MessageRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageRepository")
            .field("table", &self.table)
            .field("cached", &self.cache.read().len())
            .finish_non_exhaustive()
    }
}

impl MessageRepository {
    pub fn new(store: Arc<dyn RemoteStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
            cache: Cache::new(Vec::new()),
            state: SyncState::new(),
        }
    }

    /// Fetches all messages, newest first. Errors are logged and yield an
    /// empty inbox.
    #[tracing::instrument(skip(self), fields(table = %self.table))]
    pub async fn list(&self) -> Vec<ContactMessage> {
        let generation = self.state.begin_fetch();

        let fetched = match self.store.select(&self.table, Some(&Order::newest_first())).await {
            Ok(rows) => decode_rows::<ContactMessage>(rows),
            Err(e) => Err(e),
        };

        if !self.state.finish_fetch(generation) {
            debug!("repository unmounted since fetch started, discarding fetched messages");
            return Vec::new();
        }

        let messages = fetched.unwrap_or_else(|e| {
            error!(error = %e, "failed to load messages");
            Vec::new()
        });
        debug!(count = messages.len(), "messages loaded");

        *self.cache.write() = messages.clone();
        messages
    }

    /// Deletes a cached message. Unknown ids are a no-op.
    ///
    /// # Errors
    ///
    /// Returns the store error and leaves the cache untouched.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        let generation = self.state.generation();
        if !self.cache.read().iter().any(|m| m.id == id) {
            debug!("message not cached, nothing to delete");
            return Ok(());
        }

        if let Err(e) = self.store.delete(&self.table, id).await {
            error!(error = %e, "message delete failed");
            return Err(e);
        }

        if self.state.is_current(generation) {
            self.cache.write().retain(|m| m.id != id);
        }
        Ok(())
    }

    /// Stores a contact form submission.
    ///
    /// # Errors
    ///
    /// Returns [`FolioError::Validation`](crate::FolioError::Validation)
    /// before any network call if the submission is invalid, otherwise the
    /// store's insert error.
    #[tracing::instrument(skip(self, message), fields(email = %message.email))]
    pub async fn submit(&self, message: NewMessage) -> Result<ContactMessage> {
        message.validate()?;

        let row = to_row(&MessageInsert { fields: &message })?;
        let stored = self.store.insert(&self.table, row).await.map_err(|e| {
            error!(error = %e, "message insert failed");
            e
        })?;

        let stored: ContactMessage = decode_row(stored)?;
        debug!(message_id = %stored.id, "message stored");
        Ok(stored)
    }

    #[must_use]
    pub fn messages(&self) -> Vec<ContactMessage> {
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
}
