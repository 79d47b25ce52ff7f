//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be wired into the facade.
//! Ports speak `anyhow::Result`; the facade decides which failures are
//! recoverable.

use crate::models::{OAuthProvider, Session, SignUpOutcome};
use crate::query::{Filter, Join, Query, Table};
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use std::fmt;

/// Row-level persistence contract of the hosted backend.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Runs a filtered, ordered read. Joined rows are attached under their alias.
    async fn select(&self, query: &Query) -> anyhow::Result<Vec<Value>>;

    /// Inserts one row and returns it as stored, with server-filled columns.
    async fn insert(&self, table: Table, row: Value, joins: &[Join]) -> anyhow::Result<Value>;

    /// Merges `patch` into the row with `id` that also satisfies every
    /// `scope` filter. `None` when no such row exists.
    async fn update(
        &self,
        table: Table,
        id: &str,
        scope: &[Filter],
        patch: Value,
        joins: &[Join],
    ) -> anyhow::Result<Option<Value>>;

    /// Deletes the row with `id` that satisfies every `scope` filter.
    /// Returns whether a row was removed.
    async fn delete(&self, table: Table, id: &str, scope: &[Filter]) -> anyhow::Result<bool>;
}

/// Bucketed blob storage with public URLs.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn list_buckets(&self) -> anyhow::Result<Vec<String>>;

    /// Lists object names under `prefix`, at most `limit` of them.
    async fn list_objects(&self, bucket: &str, prefix: &str, limit: usize) -> anyhow::Result<Vec<String>>;

    /// Stores `data` at `path` inside `bucket` and returns the stored path.
    async fn upload(&self, bucket: &str, path: &str, data: Bytes, content_type: &str) -> anyhow::Result<String>;

    /// Public URL for an object. Pure string work, never touches the network.
    fn public_url(&self, bucket: &str, path: &str) -> String;

    async fn remove(&self, bucket: &str, paths: &[String]) -> anyhow::Result<()>;
}

/// Logical keys of the local fallback store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocalKey {
    Items,
    Outfits,
    Events,
}

impl LocalKey {
    pub const ALL: [LocalKey; 3] = [LocalKey::Items, LocalKey::Outfits, LocalKey::Events];

    pub fn as_str(&self) -> &'static str {
        match self {
            LocalKey::Items => "stylesync_items",
            LocalKey::Outfits => "stylesync_outfits",
            LocalKey::Events => "stylesync_events",
        }
    }
}

impl fmt::Display for LocalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Device-local key/value persistence. Values are JSON documents.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn get(&self, key: LocalKey) -> anyhow::Result<Option<String>>;
    async fn set(&self, key: LocalKey, value: &str) -> anyhow::Result<()>;
    async fn clear(&self, key: LocalKey) -> anyhow::Result<()>;
}

/// Identity contract. Tokens are opaque to the rest of the system.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Resolves an access token to its session, `None` if it is unknown or expired.
    async fn session(&self, access_token: &str) -> anyhow::Result<Option<Session>>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> anyhow::Result<Session>;

    /// Returns the URL the user must visit to complete a federated sign-in.
    async fn sign_in_with_oauth(&self, provider: OAuthProvider, redirect_to: &str) -> anyhow::Result<String>;

    async fn sign_up(&self, email: &str, password: &str, full_name: &str) -> anyhow::Result<SignUpOutcome>;

    async fn sign_out(&self, access_token: &str) -> anyhow::Result<()>;
}

/// Source of uniform random indices.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait RandomSource: Send + Sync {
    /// Returns an index in `0..len`. `len` is never zero.
    fn index(&self, len: usize) -> usize;
}
