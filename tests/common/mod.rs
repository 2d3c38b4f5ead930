//! Shared fixtures: a file-backed store that records every call and can be
//! told to fail specific operations.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use folio::storage::{JsonStore, Order, RemoteStore};
use folio::{FolioError, ImageFile, Result};
use serde_json::Value;
use tempfile::TempDir;

pub const PROJECTS: &str = "projects";
pub const CONTENT: &str = "site_content";
pub const MESSAGES: &str = "messages";
pub const PROJECT_BUCKET: &str = "project-images";
pub const CONTENT_BUCKET: &str = "site-images";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Select,
    Insert,
    Upsert,
    Delete,
    Upload,
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Select { table: String },
    SelectById { table: String, id: String },
    Insert { table: String },
    Update { table: String, id: String },
    Upsert { table: String },
    Delete { table: String, id: String },
    Upload { bucket: String, key: String },
    Remove { bucket: String, keys: Vec<String> },
}

/// [`JsonStore`] wrapper with a call log and fault injection.
pub struct RecordingStore {
    inner: JsonStore,
    calls: Mutex<Vec<Call>>,
    failing: Mutex<HashSet<Op>>,
    select_delay: Mutex<Option<Duration>>,
    truncate_inserts: Mutex<bool>,
}

impl RecordingStore {
    pub fn fail(&self, op: Op) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn recover(&self, op: Op) {
        self.failing.lock().unwrap().remove(&op);
    }

    /// Makes every select sleep first, to keep a fetch in flight.
    pub fn delay_selects(&self, delay: Duration) {
        *self.select_delay.lock().unwrap() = Some(delay);
    }

    /// Makes inserts succeed but return rows without `created_at`.
    pub fn truncate_inserted_rows(&self) {
        *self.truncate_inserts.lock().unwrap() = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn uploaded_keys(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Upload { key, .. } => Some(key),
                _ => None,
            })
            .collect()
    }

    pub fn removed_keys(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .flat_map(|call| match call {
                Call::Remove { keys, .. } => keys,
                _ => Vec::new(),
            })
            .collect()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|call| matches(call)).count()
    }

    pub fn object_exists(&self, bucket: &str, key: &str) -> bool {
        self.inner.object_exists(bucket, key)
    }

    pub fn inner(&self) -> &JsonStore {
        &self.inner
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, op: Op) -> Result<()> {
        if !self.failing.lock().unwrap().contains(&op) {
            return Ok(());
        }
        Err(match op {
            Op::Upload | Op::Remove => FolioError::ObjectStorage(format!("injected {op:?} failure")),
            _ => FolioError::Query {
                status: 503,
                message: format!("injected {op:?} failure"),
            },
        })
    }
}

#[async_trait]
impl RemoteStore for RecordingStore {
    async fn select(&self, table: &str, order: Option<&Order>) -> Result<Vec<Value>> {
        self.record(Call::Select { table: table.into() });
        let delay = *self.select_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check(Op::Select)?;
        self.inner.select(table, order).await
    }

    async fn select_by_id(&self, table: &str, id: &str) -> Result<Option<Value>> {
        self.record(Call::SelectById {
            table: table.into(),
            id: id.into(),
        });
        let delay = *self.select_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check(Op::Select)?;
        self.inner.select_by_id(table, id).await
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value> {
        self.record(Call::Insert { table: table.into() });
        self.check(Op::Insert)?;
        let mut inserted = self.inner.insert(table, row).await?;
        if *self.truncate_inserts.lock().unwrap() {
            if let Value::Object(fields) = &mut inserted {
                fields.remove("created_at");
            }
        }
        Ok(inserted)
    }

    async fn update(&self, table: &str, id: &str, patch: Value) -> Result<Value> {
        self.record(Call::Update {
            table: table.into(),
            id: id.into(),
        });
        self.inner.update(table, id, patch).await
    }

    async fn upsert(&self, table: &str, row: Value) -> Result<Value> {
        self.record(Call::Upsert { table: table.into() });
        self.check(Op::Upsert)?;
        self.inner.upsert(table, row).await
    }

    async fn delete(&self, table: &str, id: &str) -> Result<()> {
        self.record(Call::Delete {
            table: table.into(),
            id: id.into(),
        });
        self.check(Op::Delete)?;
        self.inner.delete(table, id).await
    }

    async fn upload_object(&self, bucket: &str, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        self.record(Call::Upload {
            bucket: bucket.into(),
            key: key.into(),
        });
        self.check(Op::Upload)?;
        self.inner.upload_object(bucket, key, bytes, content_type).await
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        self.inner.public_url(bucket, key)
    }

    async fn remove_objects(&self, bucket: &str, keys: &[String]) -> Result<()> {
        self.record(Call::Remove {
            bucket: bucket.into(),
            keys: keys.to_vec(),
        });
        self.check(Op::Remove)?;
        self.inner.remove_objects(bucket, keys).await
    }
}

/// Opens a recording store in a fresh temporary directory.
pub fn recording_store() -> (TempDir, Arc<RecordingStore>) {
    let dir = TempDir::new().unwrap();
    let inner = JsonStore::open(dir.path()).unwrap();
    let store = RecordingStore {
        inner,
        calls: Mutex::new(Vec::new()),
        failing: Mutex::new(HashSet::new()),
        select_delay: Mutex::new(None),
        truncate_inserts: Mutex::new(false),
    };
    (dir, Arc::new(store))
}

pub fn png(name: &str) -> ImageFile {
    ImageFile::new(name, vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a])
}
