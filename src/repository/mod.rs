//! Repositories mediating between UI state and the remote store.
//!
//! Each repository owns an in-memory cache of what the presentation layer
//! shows. Caches change only in response to completed remote operations:
//! writes are applied after the store confirmed them, using the rows the
//! store returned.
//!
//! # Failure Semantics
//!
//! - **Read paths** (`list`, `fetch`) never fail from the caller's point of
//!   view. Errors are logged and the cache degrades to empty/`None`.
//! - **Write paths** (`add`, `update`, `delete`) propagate every store error.
//! - **Cleanup** of orphaned objects is best effort: logged, never propagated.
//!
//! # Liveness
//!
//! A repository can be [unmounted](ProjectRepository::unmount) while a request
//! is in flight. Every operation records the mount generation it started in,
//! and its result reaches the cache only if that generation is still current
//! when it resolves. A result that was outstanding at unmount is therefore
//! discarded even if the repository has been mounted again since.

pub mod content;
pub mod messages;
pub mod projects;

pub use content::SiteContentRepository;
pub use messages::MessageRepository;
pub use projects::ProjectRepository;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::error::Result;

/// Loading flag and mount generation shared by all repositories.
#[derive(Debug)]
pub(crate) struct SyncState {
    loading: AtomicBool,
    mounted: AtomicBool,
    generation: AtomicU64,
}

impl SyncState {
    /// Starts mounted and loading: nothing has been fetched yet.
    pub(crate) const fn new() -> Self {
        Self {
            loading: AtomicBool::new(true),
            mounted: AtomicBool::new(true),
            generation: AtomicU64::new(0),
        }
    }

    pub(crate) fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Marks a fetch as started and returns the generation it belongs to.
    ///
    /// While unmounted the loading flag is left alone, since the result will
    /// be discarded anyway.
    pub(crate) fn begin_fetch(&self) -> u64 {
        let generation = self.generation();
        if self.is_current(generation) {
            self.loading.store(true, Ordering::SeqCst);
        }
        generation
    }

    /// Clears the loading flag if the fetch of `generation` may still touch
    /// the cache. Returns whether it may.
    pub(crate) fn finish_fetch(&self, generation: u64) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.loading.store(false, Ordering::SeqCst);
        true
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// `true` if the repository is mounted and has not been unmounted since
    /// `generation` was taken.
    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.mounted.load(Ordering::SeqCst) && self.generation() == generation
    }

    /// Starts a new generation. In-flight fetches can no longer clear the
    /// loading flag, so it is cleared here.
    pub(crate) fn unmount(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.mounted.store(false, Ordering::SeqCst);
        self.loading.store(false, Ordering::SeqCst);
    }

    pub(crate) fn mount(&self) {
        self.mounted.store(true, Ordering::SeqCst);
    }
}

/// Cache cell. Poisoned locks are recovered: the cache holds plain data.
#[derive(Debug, Default)]
pub(crate) struct Cache<T>(RwLock<T>);

impl<T> Cache<T> {
    pub(crate) const fn new(value: T) -> Self {
        Self(RwLock::new(value))
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }
}

pub(crate) fn decode_row<T: DeserializeOwned>(row: Value) -> Result<T> {
    Ok(serde_json::from_value(row)?)
}

pub(crate) fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>> {
    rows.into_iter().map(decode_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_from_before_unmount_is_stale_after_remount() {
        let state = SyncState::new();
        let generation = state.begin_fetch();

        state.unmount();
        assert!(!state.is_loading());
        state.mount();

        assert!(!state.finish_fetch(generation));
        assert!(!state.is_loading());

        let current = state.begin_fetch();
        assert!(state.is_loading());
        assert!(state.finish_fetch(current));
        assert!(!state.is_loading());
    }
}
