//! # Fallback Chain
//!
//! Reads walk an ordered list of data sources: the remote backend, then the
//! local store, then (for items and categories, when enabled) the static
//! demo dataset. Creates walk the same list for the first source that can
//! accept a write.

use crate::local_cache::LocalCache;
use crate::record::{self, LocalRecord, Record, RecordFilter};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use ss_core::error::{AppError, Result};
use ss_core::traits::RowStore;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[async_trait]
pub trait DataSource<R: Record>: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Ok(Some(_))` is a final answer. `Ok(None)` means this source has
    /// nothing to offer and the chain moves on.
    async fn try_fetch(&self, owner: &str, filter: &RecordFilter) -> anyhow::Result<Option<Vec<R>>>;

    /// Persists a new row built from `fields` for `owner`. Sources that do
    /// not accept writes return `Ok(None)`.
    async fn try_write(&self, _owner: &str, _fields: &Value) -> anyhow::Result<Option<R>> {
        Ok(None)
    }
}

pub struct FallbackChain<R: Record> {
    sources: Vec<Arc<dyn DataSource<R>>>,
}

impl<R: Record> FallbackChain<R> {
    pub fn new(sources: Vec<Arc<dyn DataSource<R>>>) -> Self {
        Self { sources }
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Never fails: exhausting every source yields an empty list.
    pub async fn fetch(&self, owner: &str, filter: &RecordFilter) -> Vec<R> {
        for source in &self.sources {
            match source.try_fetch(owner, filter).await {
                Ok(Some(records)) => {
                    debug!(table = %R::TABLE, source = source.name(), count = records.len(), "Fetched");
                    return records;
                }
                Ok(None) => continue,
                Err(e) => {
                    warn!(table = %R::TABLE, source = source.name(), error = %format!("{e:#}"), "Source failed, falling back");
                }
            }
        }
        Vec::new()
    }

    pub async fn create(&self, owner: &str, fields: Value) -> Result<R> {
        let mut last_error = None;
        for source in &self.sources {
            match source.try_write(owner, &fields).await {
                Ok(Some(record)) => {
                    info!(table = %R::TABLE, source = source.name(), id = record.id(), "Created");
                    return Ok(record);
                }
                Ok(None) => continue,
                Err(e) => {
                    warn!(table = %R::TABLE, source = source.name(), error = %format!("{e:#}"), "Write failed, falling back");
                    last_error = Some(format!("{e:#}"));
                }
            }
        }
        Err(AppError::RemoteUnavailable(
            last_error.unwrap_or_else(|| format!("no writable source for {}", R::TABLE)),
        ))
    }
}

/// The hosted backend. Its answer is authoritative, even when empty.
pub struct RemoteSource<R> {
    rows: Arc<dyn RowStore>,
    _record: PhantomData<fn() -> R>,
}

impl<R> RemoteSource<R> {
    pub fn new(rows: Arc<dyn RowStore>) -> Self {
        Self { rows, _record: PhantomData }
    }
}

#[async_trait]
impl<R: Record> DataSource<R> for RemoteSource<R> {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn try_fetch(&self, owner: &str, filter: &RecordFilter) -> anyhow::Result<Option<Vec<R>>> {
        let rows = self.rows.select(&R::query(owner, filter)).await?;
        let records = rows
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<R>, _>>()?;
        Ok(Some(records))
    }

    async fn try_write(&self, owner: &str, fields: &Value) -> anyhow::Result<Option<R>> {
        let mut row = fields.clone();
        if let Some(obj) = row.as_object_mut() {
            obj.insert("user_id".into(), Value::String(owner.to_string()));
        }
        let stored = self.rows.insert(R::TABLE, row, &R::joins()).await?;
        Ok(Some(serde_json::from_value(stored)?))
    }
}

/// The device-local collection. Answers only when it holds matching records.
pub struct LocalSource<R> {
    cache: LocalCache,
    _record: PhantomData<fn() -> R>,
}

impl<R> LocalSource<R> {
    pub fn new(cache: LocalCache) -> Self {
        Self { cache, _record: PhantomData }
    }
}

#[async_trait]
impl<R: LocalRecord> DataSource<R> for LocalSource<R> {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn try_fetch(&self, owner: &str, filter: &RecordFilter) -> anyhow::Result<Option<Vec<R>>> {
        let stored = self.cache.get::<R>().await;
        let owned = stored.into_iter().filter(|r| r.owner().map_or(true, |o| o == owner));
        let records = record::select(owned, filter);
        Ok((!records.is_empty()).then_some(records))
    }

    /// Synthesises the record the backend would have returned and keeps it
    /// at the front of the local collection.
    async fn try_write(&self, owner: &str, fields: &Value) -> anyhow::Result<Option<R>> {
        let now = Utc::now();
        let mut row = fields.clone();
        let obj = row
            .as_object_mut()
            .ok_or_else(|| anyhow::anyhow!("record fields must be a JSON object"))?;
        obj.insert("id".into(), Value::String(next_local_id(now.timestamp_millis())));
        obj.insert("user_id".into(), Value::String(owner.to_string()));
        obj.insert("created_at".into(), serde_json::to_value(now)?);
        obj.insert("updated_at".into(), serde_json::to_value(now)?);

        let record: R = serde_json::from_value(row)?;
        self.cache.add(record.clone()).await;
        Ok(Some(record))
    }
}

/// Last number handed out by [`next_local_id`], process-wide.
static LAST_LOCAL_ID: AtomicI64 = AtomicI64::new(0);

pub fn local_id(n: i64) -> String {
    format!("local-{n}")
}

/// `local-<n>` where `n` is the current time in milliseconds, bumped past
/// the previous id when several records are created within one millisecond.
pub fn next_local_id(now_millis: i64) -> String {
    let mut last = LAST_LOCAL_ID.load(Ordering::Relaxed);
    loop {
        let next = now_millis.max(last + 1);
        match LAST_LOCAL_ID.compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Relaxed) {
            Ok(_) => return local_id(next),
            Err(actual) => last = actual,
        }
    }
}

pub fn is_local_id(id: &str) -> bool {
    id.starts_with("local-")
}

/// Fixed demo records. Ignores the owner.
pub struct MockSource<R> {
    records: Vec<R>,
}

impl<R> MockSource<R> {
    pub fn new(records: Vec<R>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl<R: Record> DataSource<R> for MockSource<R> {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn try_fetch(&self, _owner: &str, filter: &RecordFilter) -> anyhow::Result<Option<Vec<R>>> {
        Ok(Some(record::select(self.records.iter().cloned(), filter)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use ss_core::models::Item;
    use ss_core::traits::{MockLocalStore, MockRowStore};

    fn item_row(id: &str, owner: &str) -> Value {
        json!({
            "id": id, "user_id": owner, "name": "Tee", "category_id": "shirts",
            "created_at": "2026-10-01T00:00:00Z", "updated_at": "2026-10-01T00:00:00Z",
        })
    }

    fn offline_rows() -> Arc<MockRowStore> {
        let mut rows = MockRowStore::new();
        rows.expect_select().returning(|_| Err(anyhow::anyhow!("connection refused")));
        rows.expect_insert().returning(|_, _, _| Err(anyhow::anyhow!("connection refused")));
        Arc::new(rows)
    }

    fn local_with(value: Option<String>) -> LocalCache {
        let mut store = MockLocalStore::new();
        store.expect_get().returning(move |_| Ok(value.clone()));
        store.expect_set().returning(|_, _| Ok(()));
        LocalCache::new(Arc::new(store))
    }

    #[tokio::test]
    async fn empty_remote_answer_is_final() {
        let mut rows = MockRowStore::new();
        rows.expect_select().returning(|_| Ok(vec![]));
        let stored = serde_json::to_string(&[item_row("l1", "u1")]).unwrap();
        let chain: FallbackChain<Item> = FallbackChain::new(vec![
            Arc::new(RemoteSource::<Item>::new(Arc::new(rows))),
            Arc::new(LocalSource::<Item>::new(local_with(Some(stored)))),
        ]);
        assert!(chain.fetch("u1", &RecordFilter::All).await.is_empty());
    }

    #[tokio::test]
    async fn local_records_of_other_owners_are_skipped() {
        let stored = serde_json::to_string(&[item_row("l1", "u2")]).unwrap();
        let chain: FallbackChain<Item> = FallbackChain::new(vec![
            Arc::new(RemoteSource::<Item>::new(offline_rows())),
            Arc::new(LocalSource::<Item>::new(local_with(Some(stored)))),
        ]);
        assert!(chain.fetch("u1", &RecordFilter::All).await.is_empty());
    }

    #[tokio::test]
    async fn empty_local_falls_through_to_mock() {
        let mock: Item = serde_json::from_value(item_row("1", "demo-user")).unwrap();
        let chain: FallbackChain<Item> = FallbackChain::new(vec![
            Arc::new(RemoteSource::<Item>::new(offline_rows())),
            Arc::new(LocalSource::<Item>::new(local_with(None))),
            Arc::new(MockSource::new(vec![mock])),
        ]);
        let items = chain.fetch("u1", &RecordFilter::All).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].user_id, "demo-user");
        assert_eq!(chain.source_names(), ["remote", "local", "mock"]);
    }

    #[tokio::test]
    async fn failed_remote_write_synthesises_local_record() {
        let chain: FallbackChain<Item> = FallbackChain::new(vec![
            Arc::new(RemoteSource::<Item>::new(offline_rows())),
            Arc::new(LocalSource::<Item>::new(local_with(None))),
        ]);
        let item = chain.create("u9", json!({ "name": "Tee", "category_id": "shirts" })).await.unwrap();
        assert!(item.id.starts_with("local-"));
        assert!(item.id["local-".len()..].parse::<i64>().is_ok());
        assert_eq!(item.user_id, "u9");
        assert_eq!(item.created_at, item.updated_at);
    }

    #[test]
    fn local_ids_increase_within_one_millisecond() {
        let first = next_local_id(1_700_000_000_000);
        let second = next_local_id(1_700_000_000_000);
        let number = |id: &str| id["local-".len()..].parse::<i64>().unwrap();
        assert!(number(&second) > number(&first));
        assert!(is_local_id(&second));
        assert!(!is_local_id("5f0c-uuid"));
    }

    #[tokio::test]
    async fn back_to_back_local_writes_get_distinct_ids() {
        let chain: FallbackChain<Item> = FallbackChain::new(vec![
            Arc::new(RemoteSource::<Item>::new(offline_rows())),
            Arc::new(LocalSource::<Item>::new(local_with(None))),
        ]);
        let a = chain.create("u1", json!({ "name": "Tee" })).await.unwrap();
        let b = chain.create("u1", json!({ "name": "Cap" })).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn chain_without_writable_source_reports_failure() {
        let chain: FallbackChain<Item> = FallbackChain::new(vec![Arc::new(RemoteSource::<Item>::new(offline_rows()))]);
        let err = chain.create("u1", json!({ "name": "Tee" })).await.unwrap_err();
        assert!(matches!(err, AppError::RemoteUnavailable(msg) if msg.contains("connection refused")));
    }
}
