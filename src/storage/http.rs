//! Hosted backend: PostgREST tables and storage buckets over HTTP.
//!
//! [`SupabaseStore`] maps the [`RemoteStore`] contract onto the REST endpoints
//! of a Supabase project:
//!
//! | Operation | Request |
//! |---|---|
//! | `select` | `GET /rest/v1/{table}?select=*&order={col}.desc` |
//! | `select_by_id` | `GET /rest/v1/{table}?select=*&id=eq.{id}` |
//! | `insert` | `POST /rest/v1/{table}` (`Prefer: return=representation`) |
//! | `update` | `PATCH /rest/v1/{table}?id=eq.{id}` |
//! | `upsert` | `POST /rest/v1/{table}?on_conflict=id` (`resolution=merge-duplicates`) |
//! | `delete` | `DELETE /rest/v1/{table}?id=eq.{id}` |
//! | `upload_object` | `POST /storage/v1/object/{bucket}/{key}` |
//! | `public_url` | `{base}/storage/v1/object/public/{bucket}/{key}` |
//! | `remove_objects` | `DELETE /storage/v1/object/{bucket}` with `{"prefixes": [...]}` |
//!
//! Every request carries the public API key both as `apikey` and as a bearer
//! token. No retries are performed; timeouts are the HTTP client's.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::backend::{Order, RemoteStore};
use crate::domain::error::{FolioError, Result};

/// Supabase-backed [`RemoteStore`].
#[derive(Clone)]
pub struct SupabaseStore {
    http_client: HttpClient,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for SupabaseStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseStore")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Builder for [`SupabaseStore`].
#[derive(Debug, Default)]
pub struct SupabaseStoreBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
}

impl SupabaseStoreBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Project URL, e.g. `https://<ref>.supabase.co`.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Public (anon) API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Request timeout. Without one, only the transport's own limits apply.
    #[must_use]
    pub const fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Builds the store.
    ///
    /// # Errors
    ///
    /// Returns [`FolioError::Config`] if the URL or key is missing, and
    /// [`FolioError::Transport`] if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<SupabaseStore> {
        let base_url = self
            .base_url
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| FolioError::Config("remote store URL is not set".into()))?;

        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| FolioError::Config("remote store API key is not set".into()))?;

        let mut http_client = HttpClient::builder();
        if let Some(secs) = self.timeout_secs {
            http_client = http_client.timeout(Duration::from_secs(secs));
        }
        let http_client = http_client.build()?;

        Ok(SupabaseStore {
            http_client,
            base_url,
            api_key,
        })
    }
}

/// Error body returned by PostgREST and the storage API.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl SupabaseStore {
    #[must_use]
    pub fn builder() -> SupabaseStoreBuilder {
        SupabaseStoreBuilder::new()
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn object_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/storage/v1/object/{bucket}/{key}", self.base_url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Sends a table request and decodes the returned row array.
    async fn send_rows(&self, request: RequestBuilder) -> Result<Vec<Value>> {
        let response = self.authorized(request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = error_message(status, response).await;
            return Err(FolioError::Query {
                status: status.as_u16(),
                message,
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }

        Ok(response.json().await?)
    }

    /// Sends a storage request, mapping failures to [`FolioError::ObjectStorage`].
    async fn send_storage(&self, request: RequestBuilder) -> Result<()> {
        let response = self.authorized(request).send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(())
        } else {
            let message = error_message(status, response).await;
            Err(FolioError::ObjectStorage(format!("{status}: {message}")))
        }
    }
}

/// Pulls a readable message out of an error response.
async fn error_message(status: StatusCode, response: Response) -> String {
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(ErrorBody { message: Some(message), .. }) => message,
        Ok(ErrorBody { error: Some(error), .. }) => error,
        _ if body.trim().is_empty() => status.canonical_reason().unwrap_or("request failed").to_string(),
        _ => body,
    }
}

/// Takes the single row a `return=representation` write answered with.
fn single_row(rows: Vec<Value>, what: impl std::fmt::Display) -> Result<Value> {
    rows.into_iter().next().ok_or_else(|| FolioError::not_found(what))
}

#[async_trait]
impl RemoteStore for SupabaseStore {
    async fn select(&self, table: &str, order: Option<&Order>) -> Result<Vec<Value>> {
        debug!(table, order = ?order, "select");
        let mut query = vec![("select".to_string(), "*".to_string())];
        if let Some(order) = order {
            let direction = if order.descending { "desc" } else { "asc" };
            query.push(("order".to_string(), format!("{}.{direction}", order.column)));
        }
        self.send_rows(self.http_client.get(self.table_url(table)).query(&query))
            .await
    }

    async fn select_by_id(&self, table: &str, id: &str) -> Result<Option<Value>> {
        debug!(table, id, "select by id");
        let rows = self
            .send_rows(
                self.http_client
                    .get(self.table_url(table))
                    .query(&[("select", "*".to_string()), ("id", format!("eq.{id}"))]),
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value> {
        debug!(table, "insert");
        let rows = self
            .send_rows(
                self.http_client
                    .post(self.table_url(table))
                    .header("Prefer", "return=representation")
                    .json(&row),
            )
            .await?;
        single_row(rows, format!("inserted row in {table}"))
    }

    async fn update(&self, table: &str, id: &str, patch: Value) -> Result<Value> {
        debug!(table, id, "update");
        let rows = self
            .send_rows(
                self.http_client
                    .patch(self.table_url(table))
                    .query(&[("id", format!("eq.{id}"))])
                    .header("Prefer", "return=representation")
                    .json(&patch),
            )
            .await?;
        single_row(rows, format!("row {id} in {table}"))
    }

    async fn upsert(&self, table: &str, row: Value) -> Result<Value> {
        debug!(table, "upsert");
        let rows = self
            .send_rows(
                self.http_client
                    .post(self.table_url(table))
                    .query(&[("on_conflict", "id")])
                    .header("Prefer", "resolution=merge-duplicates,return=representation")
                    .json(&row),
            )
            .await?;
        single_row(rows, format!("upserted row in {table}"))
    }

    async fn delete(&self, table: &str, id: &str) -> Result<()> {
        debug!(table, id, "delete");
        self.send_rows(
            self.http_client
                .delete(self.table_url(table))
                .query(&[("id", format!("eq.{id}"))]),
        )
        .await
        .map(|_| ())
    }

    async fn upload_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<()> {
        debug!(bucket, key, size = bytes.len(), "upload object");
        self.send_storage(
            self.http_client
                .post(self.object_url(bucket, key))
                .header("Content-Type", content_type)
                .header("x-upsert", "false")
                .body(bytes),
        )
        .await
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/storage/v1/object/public/{bucket}/{key}", self.base_url)
    }

    async fn remove_objects(&self, bucket: &str, keys: &[String]) -> Result<()> {
        debug!(bucket, count = keys.len(), "remove objects");
        if keys.is_empty() {
            return Ok(());
        }
        self.send_storage(
            self.http_client
                .delete(format!("{}/storage/v1/object/{bucket}", self.base_url))
                .json(&json!({ "prefixes": keys })),
        )
        .await
    }
}
