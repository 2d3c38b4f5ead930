//! Storage layer: the remote store contract and its backends.
//!
//! Repositories talk to durable state exclusively through the
//! [`RemoteStore`] trait, which is the source of truth on every (re)fetch.
//!
//! # Modules
//!
//! - `backend`: The [`RemoteStore`] trait and query ordering
//! - `http`: Hosted Supabase backend over REST
//! - `json`: Local JSON file backend for offline development and tests
//! - `keys`: Object key generation and recovery from public URLs
//! - `models`: Row payloads written by the repositories

pub mod backend;
pub mod http;
pub mod json;
pub mod keys;
pub mod models;

pub use backend::{Order, RemoteStore};
pub use http::{SupabaseStore, SupabaseStoreBuilder};
pub use json::JsonStore;
