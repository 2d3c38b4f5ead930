//! Transient user-facing notifications.
//!
//! [`NotificationQueue`] keeps toasts in insertion order. Every push allocates
//! the next sequential id and schedules its own removal after the queue's
//! time-to-live, unless the toast is dismissed first. Removal is by id and
//! idempotent.
//!
//! Expiry timers run on the ambient tokio runtime. Outside a runtime, toasts
//! only disappear when dismissed.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use serde::Serialize;

/// Default time a toast stays visible.
pub const DEFAULT_TOAST_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub kind: ToastKind,
}

#[derive(Debug, Default)]
struct QueueInner {
    next_id: u64,
    toasts: Vec<Toast>,
}

/// Ordered queue of toasts with per-entry auto-expiry.
///
/// Cloning yields another handle to the same queue.
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    inner: Arc<Mutex<QueueInner>>,
    ttl: Duration,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_TTL)
    }
}

impl NotificationQueue {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(QueueInner::default())),
            ttl,
        }
    }

    /// Appends a toast and schedules its expiry. Returns the toast id.
    pub fn push(&self, message: impl Into<String>, kind: ToastKind) -> u64 {
        let message = message.into();
        let id = {
            let mut inner = self.lock();
            inner.next_id += 1;
            let id = inner.next_id;
            inner.toasts.push(Toast { id, message, kind });
            id
        };

        tracing::debug!(toast_id = id, kind = ?kind, "toast pushed");
        self.schedule_expiry(id);
        id
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.push(message, ToastKind::Success)
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.push(message, ToastKind::Error)
    }

    /// Removes a toast. Unknown or already removed ids are a no-op.
    pub fn remove(&self, id: u64) {
        remove_from(&self.inner, id);
    }

    /// Current toasts in insertion order.
    #[must_use]
    pub fn toasts(&self) -> Vec<Toast> {
        self.lock().toasts.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().toasts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().toasts.is_empty()
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, QueueInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn schedule_expiry(&self, id: u64) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!(toast_id = id, "no async runtime, toast expires only on dismissal");
            return;
        };

        let queue: Weak<Mutex<QueueInner>> = Arc::downgrade(&self.inner);
        let deadline = tokio::time::Instant::now() + self.ttl;
        handle.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if let Some(inner) = queue.upgrade() {
                remove_from(&inner, id);
            }
        });
    }
}

fn remove_from(inner: &Mutex<QueueInner>, id: u64) {
    let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
    let before = inner.toasts.len();
    inner.toasts.retain(|toast| toast.id != id);
    if inner.toasts.len() < before {
        tracing::debug!(toast_id = id, "toast removed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn pushes_keep_insertion_order_with_sequential_ids() {
        let queue = NotificationQueue::new(Duration::from_secs(3));
        let ids: Vec<u64> = ["first", "second", "third"]
            .into_iter()
            .map(|m| queue.success(m))
            .collect();

        assert_eq!(ids, vec![1, 2, 3]);
        let messages: Vec<_> = queue.toasts().into_iter().map(|t| t.message).collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
    }

    #[tokio::test(start_paused = true)]
    async fn toasts_expire_after_ttl() {
        let queue = NotificationQueue::new(Duration::from_secs(3));
        queue.success("saved");
        tokio::time::sleep(Duration::from_secs(1)).await;
        queue.error("failed");

        tokio::time::sleep(Duration::from_millis(2500)).await;
        let remaining: Vec<_> = queue.toasts().into_iter().map(|t| t.message).collect();
        assert_eq!(remaining, vec!["failed"]);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(queue.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn manual_removal_is_idempotent() {
        let queue = NotificationQueue::new(Duration::from_secs(3));
        let a = queue.success("a");
        let b = queue.error("b");

        queue.remove(a);
        queue.remove(a);
        queue.remove(999);

        assert_eq!(queue.toasts().iter().map(|t| t.id).collect::<Vec<_>>(), vec![b]);

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert!(queue.is_empty());
    }

    #[test]
    fn without_runtime_toasts_stay_until_dismissed() {
        let queue = NotificationQueue::new(Duration::from_millis(1));
        let id = queue.error("boom");
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.toasts()[0].kind, ToastKind::Error);

        queue.remove(id);
        assert!(queue.is_empty());
    }
}
