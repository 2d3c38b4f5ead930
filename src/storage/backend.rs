//! Remote store abstraction.
//!
//! This module defines the [`RemoteStore`] trait: table-style CRUD over rows
//! plus binary object storage with public URL issuance. Repositories depend only
//! on this trait, so the hosted backend ([`SupabaseStore`](super::SupabaseStore))
//! and the local file backend ([`JsonStore`](super::JsonStore)) are
//! interchangeable.
//!
//! # Design Philosophy
//!
//! Rows travel as untyped JSON objects. Typed encoding and decoding happens in
//! the repositories, which keeps the trait object-safe and the backends
//! ignorant of the domain model.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::error::Result;

/// Column ordering for a table query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub descending: bool,
}

impl Order {
    #[must_use]
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }

    #[must_use]
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }

    /// Creation time, newest first.
    #[must_use]
    pub fn newest_first() -> Self {
        Self::desc("created_at")
    }
}

/// Abstraction over the hosted relational store and its object storage.
///
/// Identifiers are passed as strings; numeric keys are compared by their
/// decimal rendering.
///
/// # Errors
///
/// Every fallible method reports transport and rejection failures as
/// [`FolioError`](crate::FolioError) values. Backends never retry.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// `select * from table [order by ...]`.
    async fn select(&self, table: &str, order: Option<&Order>) -> Result<Vec<Value>>;

    /// Fetches a single row by id. A missing row is `Ok(None)`, not an error.
    async fn select_by_id(&self, table: &str, id: &str) -> Result<Option<Value>>;

    /// Inserts a row and returns it as stored, server-assigned fields included.
    async fn insert(&self, table: &str, row: Value) -> Result<Value>;

    /// Applies `patch` to the row with the given id and returns the updated row.
    async fn update(&self, table: &str, id: &str, patch: Value) -> Result<Value>;

    /// Inserts the row, or replaces the columns it carries if its id exists.
    async fn upsert(&self, table: &str, row: Value) -> Result<Value>;

    /// Deletes the row with the given id. Deleting a missing row succeeds.
    async fn delete(&self, table: &str, id: &str) -> Result<()>;

    /// Stores `bytes` under `key` in `bucket`.
    async fn upload_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<()>;

    /// Public URL under which an object in `bucket` is served.
    ///
    /// Pure string construction: the object does not need to exist.
    fn public_url(&self, bucket: &str, key: &str) -> String;

    /// Removes objects from `bucket`. Missing keys are ignored.
    async fn remove_objects(&self, bucket: &str, keys: &[String]) -> Result<()>;
}

/// Returns `true` if the row's `id` column renders as `id`.
pub(crate) fn row_has_id(row: &Value, id: &str) -> bool {
    row_id(row).is_some_and(|row_id| row_id == id)
}

/// Primary key of a raw row, whether the store keeps it as text or a number.
pub(crate) fn row_id(row: &Value) -> Option<String> {
    match row.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ids_match_strings_and_numbers() {
        assert!(row_has_id(&json!({"id": "abc"}), "abc"));
        assert!(row_has_id(&json!({"id": 1}), "1"));
        assert!(!row_has_id(&json!({"id": 10}), "1"));
        assert!(!row_has_id(&json!({"name": "abc"}), "abc"));
        assert_eq!(row_id(&json!({"id": 42})).as_deref(), Some("42"));
        assert_eq!(row_id(&json!({"id": null})), None);
    }

    #[test]
    fn newest_first_orders_by_creation_desc() {
        assert_eq!(Order::newest_first(), Order::desc("created_at"));
        assert!(!Order::asc("title").descending);
    }
}
