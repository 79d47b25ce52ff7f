//! # ss-backend-memory
//!
//! In-memory implementation of the `RowStore`, `ObjectStore` and `LocalStore`
//! ports. Serves as the offline demo backend and as the test double for the
//! facade: it can be switched offline to exercise the fallback chain, and it
//! counts upload calls.

mod eval;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use dashmap::DashMap;
use serde_json::Value;
use ss_core::query::{Filter, Join, Query, Table};
use ss_core::traits::{LocalKey, LocalStore, ObjectStore, RowStore};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    content_type: String,
}

pub struct MemoryBackend {
    tables: DashMap<Table, Vec<Value>>,
    buckets: DashMap<String, BTreeMap<String, StoredObject>>,
    offline: AtomicBool,
    uploads: AtomicUsize,
    public_base: String,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            tables: DashMap::new(),
            buckets: DashMap::new(),
            offline: AtomicBool::new(false),
            uploads: AtomicUsize::new(0),
            public_base: "memory://storage".to_string(),
        }
    }

    /// Creates a backend with the given storage buckets already present.
    pub fn with_buckets(names: &[&str]) -> Self {
        let backend = Self::new();
        for name in names {
            backend.create_bucket(name);
        }
        backend
    }

    pub fn create_bucket(&self, name: &str) {
        self.buckets.entry(name.to_string()).or_default();
    }

    /// Simulates the backend becoming unreachable (or reachable again).
    pub fn set_offline(&self, offline: bool) {
        debug!(offline, "Memory backend connectivity changed");
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of upload calls received, successful or not.
    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    /// Inserts rows verbatim, without filling ids or timestamps.
    pub fn seed(&self, table: Table, rows: impl IntoIterator<Item = Value>) {
        self.tables.entry(table).or_default().extend(rows);
    }

    pub fn rows(&self, table: Table) -> Vec<Value> {
        self.tables.get(&table).map(|t| t.clone()).unwrap_or_default()
    }

    pub fn object(&self, bucket: &str, path: &str) -> Option<Bytes> {
        self.buckets.get(bucket)?.get(path).map(|o| o.data.clone())
    }

    /// Content type recorded at upload.
    pub fn object_content_type(&self, bucket: &str, path: &str) -> Option<String> {
        self.buckets.get(bucket)?.get(path).map(|o| o.content_type.clone())
    }

    fn ensure_online(&self) -> anyhow::Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            anyhow::bail!("backend unreachable");
        }
        Ok(())
    }

    fn expand(&self, row: &mut Value, joins: &[Join]) {
        for join in joins {
            let target = self.rows(join.table);
            eval::attach(row, join, &target);
        }
    }
}

fn is_target(row: &Value, id: &str, scope: &[Filter]) -> bool {
    row.get("id").and_then(Value::as_str) == Some(id) && scope.iter().all(|f| eval::matches(row, f))
}

fn has_updated_at(table: Table) -> bool {
    !matches!(table, Table::Categories | Table::BoardItems)
}

#[async_trait]
impl RowStore for MemoryBackend {
    async fn select(&self, query: &Query) -> anyhow::Result<Vec<Value>> {
        self.ensure_online()?;
        let mut rows: Vec<Value> = self
            .rows(query.table)
            .into_iter()
            .filter(|row| query.filters.iter().all(|f| eval::matches(row, f)))
            .collect();
        if let Some(order) = &query.order {
            eval::sort(&mut rows, order);
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        for row in rows.iter_mut() {
            self.expand(row, &query.joins);
        }
        Ok(rows)
    }

    async fn insert(&self, table: Table, mut row: Value, joins: &[Join]) -> anyhow::Result<Value> {
        self.ensure_online()?;
        let obj = row
            .as_object_mut()
            .ok_or_else(|| anyhow::anyhow!("insert into {table} expects a JSON object"))?;
        let now = Value::String(Utc::now().to_rfc3339());
        obj.entry("id").or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        obj.entry("created_at").or_insert_with(|| now.clone());
        if has_updated_at(table) {
            obj.entry("updated_at").or_insert(now);
        }

        self.tables.entry(table).or_default().push(row.clone());
        self.expand(&mut row, joins);
        Ok(row)
    }

    async fn update(
        &self,
        table: Table,
        id: &str,
        scope: &[Filter],
        patch: Value,
        joins: &[Join],
    ) -> anyhow::Result<Option<Value>> {
        self.ensure_online()?;
        let Value::Object(patch) = patch else {
            anyhow::bail!("update of {table} expects a JSON object");
        };

        let mut updated = {
            let mut rows = self.tables.entry(table).or_default();
            let Some(row) = rows.iter_mut().find(|r| is_target(r, id, scope)) else {
                return Ok(None);
            };
            if let Some(obj) = row.as_object_mut() {
                for (k, v) in patch {
                    obj.insert(k, v);
                }
                if has_updated_at(table) {
                    obj.insert("updated_at".into(), Value::String(Utc::now().to_rfc3339()));
                }
            }
            row.clone()
        };

        self.expand(&mut updated, joins);
        Ok(Some(updated))
    }

    async fn delete(&self, table: Table, id: &str, scope: &[Filter]) -> anyhow::Result<bool> {
        self.ensure_online()?;
        let Some(mut rows) = self.tables.get_mut(&table) else {
            return Ok(false);
        };
        let before = rows.len();
        rows.retain(|r| !is_target(r, id, scope));
        Ok(rows.len() < before)
    }
}

#[async_trait]
impl ObjectStore for MemoryBackend {
    async fn list_buckets(&self) -> anyhow::Result<Vec<String>> {
        self.ensure_online()?;
        let mut names: Vec<String> = self.buckets.iter().map(|b| b.key().clone()).collect();
        names.sort();
        Ok(names)
    }

    async fn list_objects(&self, bucket: &str, prefix: &str, limit: usize) -> anyhow::Result<Vec<String>> {
        self.ensure_online()?;
        let objects = self
            .buckets
            .get(bucket)
            .ok_or_else(|| anyhow::anyhow!("bucket not found: {bucket}"))?;
        Ok(objects.keys().filter(|k| k.starts_with(prefix)).take(limit).cloned().collect())
    }

    async fn upload(&self, bucket: &str, path: &str, data: Bytes, content_type: &str) -> anyhow::Result<String> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        self.ensure_online()?;
        let mut objects = self
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| anyhow::anyhow!("bucket not found: {bucket}"))?;
        if objects.contains_key(path) {
            anyhow::bail!("the resource already exists: {bucket}/{path}");
        }
        objects.insert(path.to_string(), StoredObject { data, content_type: content_type.to_string() });
        Ok(path.to_string())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/{}/{}", self.public_base, bucket, path)
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> anyhow::Result<()> {
        self.ensure_online()?;
        if let Some(mut objects) = self.buckets.get_mut(bucket) {
            for path in paths {
                objects.remove(path);
            }
        }
        Ok(())
    }
}

/// Local fallback store kept in process memory.
#[derive(Default)]
pub struct MemoryLocalStore {
    entries: DashMap<LocalKey, String>,
    broken: AtomicBool,
}

impl MemoryLocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail, like a full or disabled browser store.
    pub fn set_broken(&self, broken: bool) {
        self.broken.store(broken, Ordering::SeqCst);
    }

    fn ensure_usable(&self) -> anyhow::Result<()> {
        if self.broken.load(Ordering::SeqCst) {
            anyhow::bail!("local store unavailable");
        }
        Ok(())
    }
}

#[async_trait]
impl LocalStore for MemoryLocalStore {
    async fn get(&self, key: LocalKey) -> anyhow::Result<Option<String>> {
        self.ensure_usable()?;
        Ok(self.entries.get(&key).map(|v| v.clone()))
    }

    async fn set(&self, key: LocalKey, value: &str) -> anyhow::Result<()> {
        self.ensure_usable()?;
        self.entries.insert(key, value.to_string());
        Ok(())
    }

    async fn clear(&self, key: LocalKey) -> anyhow::Result<()> {
        self.ensure_usable()?;
        self.entries.remove(&key);
        Ok(())
    }
}
