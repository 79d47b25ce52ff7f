//! Typed access to the local fallback store.
//!
//! Each collection is one JSON array under its `LocalKey`. Storage and
//! decoding failures are logged and swallowed: a broken local store behaves
//! like an empty one.
//!
//! Read-modify-write operations hold a lock shared by every clone, so
//! concurrent writers never drop each other's records.

use crate::record::LocalRecord;
use chrono::Utc;
use serde_json::Value;
use ss_core::traits::LocalStore;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::error;

#[derive(Clone)]
pub struct LocalCache {
    store: Arc<dyn LocalStore>,
    writes: Arc<Mutex<()>>,
}

impl LocalCache {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store, writes: Arc::new(Mutex::new(())) }
    }

    pub async fn get<R: LocalRecord>(&self) -> Vec<R> {
        let raw = match self.store.get(R::LOCAL_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                error!(key = %R::LOCAL_KEY, error = %e, "Failed to read local collection");
                return Vec::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            error!(key = %R::LOCAL_KEY, error = %e, "Discarding unreadable local collection");
            Vec::new()
        })
    }

    /// Replaces the collection. An empty slice clears the key.
    pub async fn set<R: LocalRecord>(&self, records: &[R]) {
        if records.is_empty() {
            return self.clear::<R>().await;
        }
        let encoded = match serde_json::to_string(records) {
            Ok(encoded) => encoded,
            Err(e) => {
                error!(key = %R::LOCAL_KEY, error = %e, "Failed to encode local collection");
                return;
            }
        };
        if let Err(e) = self.store.set(R::LOCAL_KEY, &encoded).await {
            error!(key = %R::LOCAL_KEY, error = %e, "Failed to write local collection");
        }
    }

    pub async fn clear<R: LocalRecord>(&self) {
        if let Err(e) = self.store.clear(R::LOCAL_KEY).await {
            error!(key = %R::LOCAL_KEY, error = %e, "Failed to clear local collection");
        }
    }

    /// Stores `record` at the front of its collection.
    pub async fn add<R: LocalRecord>(&self, record: R) {
        let _guard = self.writes.lock().await;
        let mut records = self.get::<R>().await;
        records.insert(0, record);
        self.set(&records).await;
    }

    /// Merges the fields of `patch` into `owner`'s record `id` and bumps
    /// `updated_at`. `None` when the owner has no such record.
    pub async fn update<R: LocalRecord>(&self, owner: &str, id: &str, patch: &Value) -> Option<R> {
        let _guard = self.writes.lock().await;
        let mut records = self.get::<R>().await;
        let slot = records.iter_mut().find(|r| r.id() == id && r.owner() == Some(owner))?;

        let mut merged = match serde_json::to_value(&*slot) {
            Ok(value) => value,
            Err(e) => {
                error!(key = %R::LOCAL_KEY, id, error = %e, "Failed to encode local record");
                return None;
            }
        };
        if let (Some(fields), Some(changes)) = (merged.as_object_mut(), patch.as_object()) {
            fields.extend(changes.iter().map(|(k, v)| (k.clone(), v.clone())));
            fields.insert("updated_at".into(), Value::String(Utc::now().to_rfc3339()));
        }
        let updated: R = match serde_json::from_value(merged) {
            Ok(updated) => updated,
            Err(e) => {
                error!(key = %R::LOCAL_KEY, id, error = %e, "Patch left local record unreadable");
                return None;
            }
        };

        *slot = updated.clone();
        self.set(&records).await;
        Some(updated)
    }

    /// Drops `owner`'s record `id`. Returns whether it existed.
    pub async fn remove<R: LocalRecord>(&self, owner: &str, id: &str) -> bool {
        let _guard = self.writes.lock().await;
        let mut records = self.get::<R>().await;
        let before = records.len();
        records.retain(|r| !(r.id() == id && r.owner() == Some(owner)));
        if records.len() == before {
            return false;
        }
        self.set(&records).await;
        true
    }

    /// Drops every record of `owner` and returns how many there were.
    pub async fn remove_owned_by<R: LocalRecord>(&self, owner: &str) -> usize {
        let _guard = self.writes.lock().await;
        let mut records = self.get::<R>().await;
        let before = records.len();
        records.retain(|r| r.owner() != Some(owner));
        let removed = before - records.len();
        if removed > 0 {
            self.set(&records).await;
        }
        removed
    }
}
