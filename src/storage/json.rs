//! JSON file-based store for offline development.
//!
//! [`JsonStore`] implements the [`RemoteStore`] contract on the local
//! filesystem: all tables live in one human-readable JSON document written
//! atomically (write-to-temp + rename), and objects are plain files under
//! `objects/<bucket>/<key>`. Like the hosted backend it assigns `id` and
//! `created_at` on insert.
//!
//! # Layout
//!
//! ```text
//! <root>/
//!   store.json            tables
//!   objects/<bucket>/...  uploaded objects
//! ```
//!
//! # File Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "tables": {
//!     "projects": [
//!       { "id": "5b1c...", "title": "X", "created_at": "2024-05-01T10:00:00.000000Z", "views": 0 }
//!     ],
//!     "site_content": [ { "id": 1, "hero_title": "Hello" } ]
//!   }
//! }
//! ```
//!
//! # Performance Characteristics
//!
//! - **Read**: served from memory, loaded once on open
//! - **Write**: O(n), the whole document is rewritten
//! - **Best for**: a handful of tables with at most a few thousand rows
//! - **Blocking**: file I/O runs on the calling executor thread

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::backend::{row_has_id, Order, RemoteStore};
use crate::domain::error::{FolioError, Result};

const STORE_FILE: &str = "store.json";
const OBJECTS_DIR: &str = "objects";

/// Tables whose new rows get a `views` counter starting at zero.
const COUNTED_TABLES: &[&str] = &["projects"];

/// On-disk document format.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreData {
    /// Version of the storage format for future migrations.
    version: u32,

    #[serde(default)]
    tables: BTreeMap<String, Vec<Value>>,
}

impl Default for StoreData {
    fn default() -> Self {
        Self {
            version: 1,
            tables: BTreeMap::new(),
        }
    }
}

/// Local filesystem [`RemoteStore`].
///
/// # Thread Safety
///
/// The document is guarded by a mutex and every mutation is persisted before
/// the lock is released, so concurrent callers observe a consistent store.
///
/// # Blocking
///
/// The async methods do plain `std::fs` I/O, and mutations write the whole
/// document while holding the lock. They block the executor thread they run
/// on. This is a development and test backend; use
/// [`SupabaseStore`](super::SupabaseStore) for a deployed site.
#[derive(Debug)]
pub struct JsonStore {
    root: PathBuf,
    public_base: String,
    data: Mutex<StoreData>,
}

impl JsonStore {
    /// Opens or creates a store rooted at `root`.
    ///
    /// Public URLs are `file://` URLs into the objects directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or an existing
    /// `store.json` cannot be parsed.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use folio::storage::{JsonStore, RemoteStore};
    ///
    /// let store = JsonStore::open("/tmp/folio-dev")?;
    /// assert!(store.public_url("project-images", "k.png").starts_with("file://"));
    /// # Ok::<(), folio::FolioError>(())
    /// ```
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let public_base = format!("file://{}", root.join(OBJECTS_DIR).display());
        Self::open_with_public_base(root, public_base)
    }

    /// Opens a store whose objects are served from `public_base` (for example
    /// a local static file server).
    ///
    /// # Errors
    ///
    /// Same as [`JsonStore::open`].
    pub fn open_with_public_base(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Result<Self> {
        let root = root.into();
        tracing::debug!(root = ?root, "opening JSON store");

        std::fs::create_dir_all(root.join(OBJECTS_DIR))?;

        let file_path = root.join(STORE_FILE);
        let data = if file_path.exists() {
            Self::load_from_file(&file_path)?
        } else {
            tracing::debug!("initializing new empty store");
            StoreData::default()
        };

        Ok(Self {
            root,
            public_base: public_base.into().trim_end_matches('/').to_string(),
            data: Mutex::new(data),
        })
    }

    /// Directory the store lives in.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns `true` if an object exists in `bucket` under `key`.
    #[must_use]
    pub fn object_exists(&self, bucket: &str, key: &str) -> bool {
        self.object_path(bucket, key).is_ok_and(|path| path.is_file())
    }

    fn load_from_file(path: &Path) -> Result<StoreData> {
        let contents = std::fs::read_to_string(path)?;
        let data: StoreData = serde_json::from_str(&contents)?;

        tracing::debug!(
            version = data.version,
            tables = data.tables.len(),
            "loaded store data"
        );
        Ok(data)
    }

    /// Writes the document atomically.
    fn save(&self, data: &StoreData) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        let file_path = self.root.join(STORE_FILE);
        let tmp_path = file_path.with_extension("tmp");

        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &file_path)?;

        tracing::trace!(path = ?file_path, "store saved");
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, StoreData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `mutate` to a copy of the document and persists it.
    ///
    /// The in-memory document is only replaced once the write succeeded.
    fn mutate<T>(&self, mutate: impl FnOnce(&mut StoreData) -> Result<T>) -> Result<T> {
        let mut guard = self.lock();
        let mut draft = guard.clone();
        let value = mutate(&mut draft)?;
        self.save(&draft)?;
        *guard = draft;
        Ok(value)
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        let valid_segment = |segment: &str| !segment.is_empty() && segment != "." && segment != "..";
        if !valid_segment(bucket) || bucket.contains('/') || !key.split('/').all(valid_segment) {
            return Err(FolioError::ObjectStorage(format!("invalid object key: {bucket}/{key}")));
        }
        Ok(self.root.join(OBJECTS_DIR).join(bucket).join(key))
    }
}

/// Fixed-width UTC timestamp, so string order is chronological order.
fn now_timestamp() -> Value {
    Value::String(chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true))
}

fn as_object(row: Value) -> Result<Map<String, Value>> {
    match row {
        Value::Object(map) => Ok(map),
        other => Err(FolioError::Query {
            status: 400,
            message: format!("row must be a JSON object, got {other}"),
        }),
    }
}

fn id_of(row: &Map<String, Value>) -> Option<String> {
    match row.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Ordering of JSON scalars: nulls first, then numbers, strings, booleans.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None | Some(Value::Null) => 0,
            Some(Value::Number(_)) => 1,
            Some(Value::String(_)) => 2,
            Some(Value::Bool(_)) => 3,
            Some(_) => 4,
        }
    }

    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[async_trait]
impl RemoteStore for JsonStore {
    async fn select(&self, table: &str, order: Option<&Order>) -> Result<Vec<Value>> {
        let _span = tracing::debug_span!("json_select", table).entered();

        let mut rows = self.lock().tables.get(table).cloned().unwrap_or_default();
        if let Some(order) = order {
            rows.sort_by(|a, b| {
                let ordering = compare_values(a.get(&order.column), b.get(&order.column));
                if order.descending { ordering.reverse() } else { ordering }
            });
        }

        tracing::debug!(count = rows.len(), "rows selected");
        Ok(rows)
    }

    async fn select_by_id(&self, table: &str, id: &str) -> Result<Option<Value>> {
        let guard = self.lock();
        Ok(guard
            .tables
            .get(table)
            .and_then(|rows| rows.iter().find(|row| row_has_id(row, id)))
            .cloned())
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value> {
        let _span = tracing::debug_span!("json_insert", table).entered();
        let mut row = as_object(row)?;

        if id_of(&row).is_none() {
            row.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
        }
        row.entry("created_at").or_insert_with(now_timestamp);
        if COUNTED_TABLES.contains(&table) {
            row.entry("views").or_insert_with(|| Value::from(0));
        }

        let id = id_of(&row).unwrap_or_default();
        let row = Value::Object(row);

        self.mutate(|data| {
            let rows = data.tables.entry(table.to_string()).or_default();
            if rows.iter().any(|existing| row_has_id(existing, &id)) {
                return Err(FolioError::Query {
                    status: 409,
                    message: format!("duplicate key: id {id} already exists in {table}"),
                });
            }
            rows.push(row.clone());
            Ok(())
        })?;

        tracing::debug!(id = %id, "row inserted");
        Ok(row)
    }

    async fn update(&self, table: &str, id: &str, patch: Value) -> Result<Value> {
        let _span = tracing::debug_span!("json_update", table, id).entered();
        let patch = as_object(patch)?;

        self.mutate(|data| {
            let row = data
                .tables
                .get_mut(table)
                .and_then(|rows| rows.iter_mut().find(|row| row_has_id(row, id)))
                .and_then(Value::as_object_mut)
                .ok_or_else(|| FolioError::not_found(format!("row {id} in {table}")))?;

            for (column, value) in patch {
                if column != "id" {
                    row.insert(column, value);
                }
            }
            Ok(Value::Object(row.clone()))
        })
    }

    async fn upsert(&self, table: &str, row: Value) -> Result<Value> {
        let _span = tracing::debug_span!("json_upsert", table).entered();
        let row = as_object(row)?;
        let id = id_of(&row).ok_or_else(|| FolioError::Query {
            status: 400,
            message: "upsert requires an id column".into(),
        })?;

        self.mutate(|data| {
            let rows = data.tables.entry(table.to_string()).or_default();
            if let Some(existing) = rows
                .iter_mut()
                .find(|existing| row_has_id(existing, &id))
                .and_then(Value::as_object_mut)
            {
                tracing::debug!(id = %id, "replacing existing row");
                existing.extend(row);
                return Ok(Value::Object(existing.clone()));
            }

            tracing::debug!(id = %id, "inserting new row");
            let mut row = row;
            row.entry("created_at").or_insert_with(now_timestamp);
            let row = Value::Object(row);
            rows.push(row.clone());
            Ok(row)
        })
    }

    async fn delete(&self, table: &str, id: &str) -> Result<()> {
        let _span = tracing::debug_span!("json_delete", table, id).entered();
        self.mutate(|data| {
            if let Some(rows) = data.tables.get_mut(table) {
                let before = rows.len();
                rows.retain(|row| !row_has_id(row, id));
                tracing::debug!(removed = before - rows.len(), "rows deleted");
            }
            Ok(())
        })
    }

    async fn upload_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<()> {
        let _span = tracing::debug_span!("json_upload_object", bucket, key).entered();
        let path = self.object_path(bucket, key)?;

        if path.exists() {
            return Err(FolioError::ObjectStorage(format!("object already exists: {bucket}/{key}")));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, bytes)?;

        tracing::debug!(path = ?path, "object stored");
        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/{bucket}/{key}", self.public_base)
    }

    async fn remove_objects(&self, bucket: &str, keys: &[String]) -> Result<()> {
        let _span = tracing::debug_span!("json_remove_objects", bucket, count = keys.len()).entered();
        for key in keys {
            let path = self.object_path(bucket, key)?;
            match std::fs::remove_file(&path) {
                Ok(()) => tracing::debug!(key = %key, "object removed"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::debug!(key = %key, "object already absent");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn open() -> (tempfile::TempDir, JsonStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn insert_assigns_server_fields() {
        let (_dir, store) = open();
        let row = store.insert("projects", json!({"title": "X"})).await.unwrap();

        assert!(row["id"].as_str().is_some_and(|id| !id.is_empty()));
        assert!(row["created_at"].is_string());
        assert_eq!(row["views"], 0);

        let other = store.insert("messages", json!({"name": "Ana"})).await.unwrap();
        assert!(other.get("views").is_none());
    }

    #[tokio::test]
    async fn data_survives_reopen() {
        let (dir, store) = open();
        store.insert("projects", json!({"id": "p1", "title": "X"})).await.unwrap();
        drop(store);

        let reopened = JsonStore::open(dir.path()).unwrap();
        let row = reopened.select_by_id("projects", "p1").await.unwrap();
        assert_eq!(row.unwrap()["title"], "X");
    }

    #[tokio::test]
    async fn select_orders_by_column() {
        let (_dir, store) = open();
        for (id, at) in [("a", "2024-01-01T00:00:00+00:00"), ("b", "2024-03-01T00:00:00+00:00"), ("c", "2024-02-01T00:00:00+00:00")] {
            store.insert("projects", json!({"id": id, "created_at": at})).await.unwrap();
        }

        let rows = store.select("projects", Some(&Order::newest_first())).await.unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);

        assert!(store.select("missing", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() {
        let (_dir, store) = open();
        store.insert("projects", json!({"id": "p1"})).await.unwrap();
        let err = store.insert("projects", json!({"id": "p1"})).await.unwrap_err();
        assert!(matches!(err, FolioError::Query { status: 409, .. }));
    }

    #[tokio::test]
    async fn upsert_creates_then_merges() {
        let (_dir, store) = open();
        let created = store.upsert("site_content", json!({"id": 1, "hero_title": "A", "about_p1": "x"})).await.unwrap();
        assert_eq!(created["hero_title"], "A");

        let replaced = store.upsert("site_content", json!({"id": 1, "hero_title": "B"})).await.unwrap();
        assert_eq!(replaced["hero_title"], "B");
        assert_eq!(replaced["about_p1"], "x");
        assert_eq!(store.select("site_content", None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_missing_row_is_not_found() {
        let (_dir, store) = open();
        let err = store.update("projects", "nope", json!({"title": "Z"})).await.unwrap_err();
        assert!(matches!(err, FolioError::Query { status: 404, .. }));
    }

    #[tokio::test]
    async fn update_keeps_id() {
        let (_dir, store) = open();
        store.insert("projects", json!({"id": "p1", "title": "X"})).await.unwrap();
        let row = store.update("projects", "p1", json!({"id": "p2", "title": "Z"})).await.unwrap();
        assert_eq!(row["id"], "p1");
        assert_eq!(row["title"], "Z");
    }

    #[tokio::test]
    async fn delete_missing_row_succeeds() {
        let (_dir, store) = open();
        store.delete("projects", "ghost").await.unwrap();
    }

    #[tokio::test]
    async fn objects_upload_and_remove() {
        let (_dir, store) = open();
        store.upload_object("site-images", "about/a.png", vec![1, 2], "image/png").await.unwrap();
        assert!(store.object_exists("site-images", "about/a.png"));

        let again = store.upload_object("site-images", "about/a.png", vec![3], "image/png").await;
        assert!(matches!(again, Err(FolioError::ObjectStorage(_))));

        store.remove_objects("site-images", &["about/a.png".into(), "about/missing.png".into()]).await.unwrap();
        assert!(!store.object_exists("site-images", "about/a.png"));
    }

    #[tokio::test]
    async fn traversal_keys_are_rejected() {
        let (_dir, store) = open();
        let err = store.upload_object("b", "../escape.png", vec![], "image/png").await.unwrap_err();
        assert!(matches!(err, FolioError::ObjectStorage(_)));
    }

    #[test]
    fn public_urls_point_into_objects_dir() {
        let (dir, store) = open();
        let url = store.public_url("project-images", "k.png");
        assert!(url.starts_with("file://"));
        assert!(url.ends_with("/objects/project-images/k.png"));
        assert!(url.contains(&dir.path().display().to_string()));
    }
}
