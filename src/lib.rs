//! Folio: content and data synchronization for a personal portfolio site.
//!
//! The crate mediates between a portfolio's presentation layer and a hosted
//! relational store with object storage for images:
//! - Project list with image upload sequencing and orphan cleanup
//! - Singleton site content record saved with insert-or-replace semantics
//! - Contact message inbox for the admin dashboard
//! - Auto-expiring notification queue for user-facing results
//! - Single-secret admin session gate and path-based view selection
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Presentation (not part of this crate)              │
//! └─────────────────────────────────────────────────────┘
//!                 │ Event              ▲ DashboardSnapshot, Action
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │
//! │  - Event handling, toasts, session gate, routing    │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Repository Layer (repository/)                     │
//! │  - In-memory caches, write sequencing, liveness     │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Storage Layer (storage/)                           │
//! │  - RemoteStore trait                                │
//! │  - Supabase over HTTP, local JSON files             │
//! └─────────────────────────────────────────────────────┘
//!         │                                     │
//! ┌───────────────────────────┐   ┌───────────────────────────┐
//! │ Domain (domain/)          │   │ Observability, paths      │
//! │ - Records, errors, skills │   │ - JSON lines span export  │
//! └───────────────────────────┘   └───────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`app`]: Event handler, application state, toasts, session gate, router
//! - [`domain`]: Records (`Project`, `SiteContent`, `ContactMessage`), errors
//! - [`repository`]: Cached, store-backed repositories
//! - [`storage`]: Remote store contract and its backends
//! - [`infrastructure`]: Data directory and path helpers
//! - [`observability`]: Span export to a rotating JSON lines file
//!
//! # Configuration
//!
//! Every field has a default; a TOML file only needs to name what differs:
//!
//! ```toml
//! store_url = "https://myproject.supabase.co"
//! api_key = "public-anon-key"
//! admin_secret = "correct horse battery staple"
//! toast_ttl_ms = 4000
//! trace_level = "folio=debug"
//! ```
//!
//! Setting `local_store_dir` swaps the hosted store for JSON files on disk.
//!
//! # Example
//!
//! ```rust,no_run
//! use folio::{handle_event, initialize, Config, Event};
//!
//! # async fn run() -> folio::Result<()> {
//! let config = Config::from_toml_str(r#"local_store_dir = "/tmp/folio-store""#)?;
//! let mut state = initialize(&config)?;
//!
//! let (render, _actions) = handle_event(&mut state, Event::Mount).await?;
//! if render {
//!     let snapshot = state.snapshot();
//!     println!("{} projects", snapshot.projects.len());
//! }
//! # Ok(())
//! # }
//! ```

#![allow(clippy::multiple_crate_versions)]

pub mod app;
pub mod domain;
pub mod infrastructure;
pub mod observability;
pub mod repository;
pub mod storage;

pub use app::{handle_event, Action, AppState, AuthStatus, DashboardSnapshot, Event, Route, ToastKind};
pub use domain::{ContactMessage, FolioError, ImageFile, NewMessage, NewProject, Project, Result, SiteContent};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::app::router::{DEFAULT_ADMIN_PATH, DEFAULT_LOGIN_PATH};
use crate::app::session::MemorySessionStorage;
use crate::app::toast::DEFAULT_TOAST_TTL;
use crate::infrastructure::paths::expand_tilde;
use crate::storage::{JsonStore, RemoteStore, SupabaseStore};

/// Runtime configuration.
///
/// Loaded from TOML with [`Config::load`] / [`Config::from_toml_str`] or from
/// a flat string map with [`Config::from_map`]. Missing fields take their
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Base URL of the hosted store. Default: `http://localhost:54321`
    pub store_url: String,

    /// Public API key of the hosted store. Empty by default, which makes
    /// [`initialize`] fail unless `local_store_dir` is set.
    pub api_key: String,

    /// Optional request timeout for the hosted store.
    pub request_timeout_secs: Option<u64>,

    pub projects_table: String,
    pub content_table: String,
    pub messages_table: String,
    pub project_bucket: String,
    pub content_bucket: String,

    /// How long a toast stays visible, in milliseconds. Default: 5000
    pub toast_ttl_ms: u64,

    /// Shared admin password. Default: `"password"`
    pub admin_secret: String,

    pub admin_path: String,
    pub login_path: String,

    /// Use JSON files in this directory instead of the hosted store.
    pub local_store_dir: Option<PathBuf>,

    /// Where span logs are written. Default: the platform data directory.
    pub data_dir: Option<PathBuf>,

    /// `EnvFilter` directive for exported spans. Default: `"info"`
    pub trace_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_url: "http://localhost:54321".to_string(),
            api_key: String::new(),
            request_timeout_secs: None,
            projects_table: "projects".to_string(),
            content_table: "site_content".to_string(),
            messages_table: "messages".to_string(),
            project_bucket: "project-images".to_string(),
            content_bucket: "site-images".to_string(),
            toast_ttl_ms: u64::try_from(DEFAULT_TOAST_TTL.as_millis()).unwrap_or(5000),
            admin_secret: "password".to_string(),
            admin_path: DEFAULT_ADMIN_PATH.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            local_store_dir: None,
            data_dir: None,
            trace_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`FolioError::Config`] for malformed TOML, wrongly typed
    /// values, or unknown keys.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input).map_err(|e| FolioError::Config(e.to_string()))
    }

    /// Reads and parses a TOML file. A leading `~` in `path` is expanded.
    ///
    /// # Errors
    ///
    /// Returns [`FolioError::Io`] if the file cannot be read and
    /// [`FolioError::Config`] if it does not parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = expand_tilde(path.as_ref());
        let input = std::fs::read_to_string(&path)?;
        tracing::debug!(path = %path.display(), "configuration file read");
        Self::from_toml_str(&input)
    }

    /// Builds a configuration from string key/value pairs, e.g. environment
    /// or host-provided settings.
    ///
    /// Keys are the field names. Unknown keys are ignored, and values that do
    /// not parse fall back to the default.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use folio::Config;
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("admin_secret".to_string(), "s3cret".to_string());
    /// map.insert("toast_ttl_ms".to_string(), "not a number".to_string());
    ///
    /// let config = Config::from_map(&map);
    /// assert_eq!(config.admin_secret, "s3cret");
    /// assert_eq!(config.toast_ttl_ms, 5000);
    /// ```
    #[must_use]
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        let defaults = Self::default();
        let text = |key: &str, default: String| {
            map.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map_or(default, String::from)
        };
        let path = |key: &str| {
            map.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };

        Self {
            store_url: text("store_url", defaults.store_url),
            api_key: text("api_key", defaults.api_key),
            request_timeout_secs: map.get("request_timeout_secs").and_then(|v| v.trim().parse().ok()),
            projects_table: text("projects_table", defaults.projects_table),
            content_table: text("content_table", defaults.content_table),
            messages_table: text("messages_table", defaults.messages_table),
            project_bucket: text("project_bucket", defaults.project_bucket),
            content_bucket: text("content_bucket", defaults.content_bucket),
            toast_ttl_ms: map
                .get("toast_ttl_ms")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.toast_ttl_ms),
            admin_secret: text("admin_secret", defaults.admin_secret),
            admin_path: text("admin_path", defaults.admin_path),
            login_path: text("login_path", defaults.login_path),
            local_store_dir: path("local_store_dir"),
            data_dir: path("data_dir"),
            trace_level: text("trace_level", defaults.trace_level),
        }
    }

    #[must_use]
    pub const fn toast_ttl(&self) -> Duration {
        Duration::from_millis(self.toast_ttl_ms)
    }
}

/// Builds the store backend selected by `config`.
///
/// # Errors
///
/// Returns [`FolioError::Config`] if the hosted store is selected without a
/// URL or API key, and I/O errors from opening a local store.
pub fn connect_store(config: &Config) -> Result<Arc<dyn RemoteStore>> {
    if let Some(dir) = &config.local_store_dir {
        let dir = expand_tilde(dir);
        tracing::info!(dir = %dir.display(), "using local JSON store");
        return Ok(Arc::new(JsonStore::open(dir)?));
    }

    let mut builder = SupabaseStore::builder()
        .base_url(&config.store_url)
        .api_key(&config.api_key);
    if let Some(secs) = config.request_timeout_secs {
        builder = builder.timeout_secs(secs);
    }

    tracing::info!(url = %config.store_url, "using hosted store");
    Ok(Arc::new(builder.build()?))
}

/// Initializes tracing and builds the application state.
///
/// The session marker lives in process memory, so a session lasts as long as
/// the returned state's process. Nothing is fetched yet; send
/// [`Event::Mount`] to resolve the gate and load data.
///
/// # Errors
///
/// Fails if the store backend cannot be built (see [`connect_store`]).
pub fn initialize(config: &Config) -> Result<AppState> {
    let tracing_installed = observability::init_tracing(config);
    tracing::debug!(tracing_installed, "initializing folio");

    let store = connect_store(config)?;
    Ok(AppState::new(config, store, Arc::new(MemorySessionStorage::new())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_overrides_only_named_fields() {
        let config = Config::from_toml_str(
            r#"
            store_url = "https://demo.supabase.co"
            api_key = "anon"
            toast_ttl_ms = 1500
            local_store_dir = "/tmp/folio"
            "#,
        )
        .unwrap();

        assert_eq!(config.store_url, "https://demo.supabase.co");
        assert_eq!(config.toast_ttl(), Duration::from_millis(1500));
        assert_eq!(config.local_store_dir, Some(PathBuf::from("/tmp/folio")));
        assert_eq!(config.projects_table, "projects");
        assert_eq!(config.login_path, "/login-55");
    }

    #[test]
    fn toml_rejects_unknown_keys_and_bad_types() {
        assert!(matches!(Config::from_toml_str("stor_url = 'x'"), Err(FolioError::Config(_))));
        assert!(matches!(Config::from_toml_str("toast_ttl_ms = 'soon'"), Err(FolioError::Config(_))));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folio.toml");
        std::fs::write(&path, "admin_secret = 'hunter2'\n").unwrap();

        assert_eq!(Config::load(&path).unwrap().admin_secret, "hunter2");
        assert!(matches!(Config::load(dir.path().join("missing.toml")), Err(FolioError::Io(_))));
    }

    #[test]
    fn map_values_are_trimmed_and_blank_means_default() {
        let map: BTreeMap<String, String> = [
            ("project_bucket", " covers "),
            ("api_key", "   "),
            ("local_store_dir", "/srv/folio"),
            ("request_timeout_secs", "10"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config = Config::from_map(&map);
        assert_eq!(config.project_bucket, "covers");
        assert_eq!(config.api_key, "");
        assert_eq!(config.local_store_dir, Some(PathBuf::from("/srv/folio")));
        assert_eq!(config.request_timeout_secs, Some(10));
    }

    #[test]
    fn hosted_store_requires_api_key() {
        assert!(matches!(connect_store(&Config::default()), Err(FolioError::Config(_))));
    }

    #[test]
    fn local_store_dir_selects_json_backend() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            local_store_dir: Some(dir.path().to_path_buf()),
            ..Config::default()
        };
        assert!(connect_store(&config).is_ok());
    }
}
