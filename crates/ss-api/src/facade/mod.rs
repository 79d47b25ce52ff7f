//! # StyleSync facade
//!
//! One entry point per entity, all sharing the injected [`Ports`]. Reads and
//! creates of items, outfits and events go through a [`FallbackChain`];
//! every other write talks to the backend directly and surfaces failures.
//!
//! Writes to existing rows are scoped to the caller: a row owned by someone
//! else reads as not found. Records created offline (`local-<n>` ids) are
//! changed in the local cache instead of the backend.

pub mod auth;
pub mod boards;
pub mod categories;
pub mod diagnostics;
pub mod events;
pub mod items;
pub mod outfits;
pub mod users;

use crate::fallback::{is_local_id, DataSource, FallbackChain, LocalSource, MockSource, RemoteSource};
use crate::local_cache::LocalCache;
use crate::mock;
use crate::record::LocalRecord;
use chrono::{NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use ss_core::error::{AppError, Result};
use ss_core::models::{Category, Event, Item, Outfit};
use ss_core::query::{Filter, Join, Query, Table};
use ss_core::traits::{AuthProvider, LocalStore, ObjectStore, RandomSource, RowStore};
use std::sync::Arc;

pub use auth::AuthApi;
pub use boards::BoardsApi;
pub use categories::CategoriesApi;
pub use diagnostics::{ConnectionReport, DatabaseReport, DiagnosticsApi, LocalClearReport, StorageReport};
pub use events::EventsApi;
pub use items::ItemsApi;
pub use outfits::OutfitsApi;
pub use users::UsersApi;

/// Collaborators injected into the facade.
#[derive(Clone)]
pub struct Ports {
    pub rows: Arc<dyn RowStore>,
    pub objects: Arc<dyn ObjectStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub local: Arc<dyn LocalStore>,
    pub random: Arc<dyn RandomSource>,
}

#[derive(Debug, Clone)]
pub struct FacadeOptions {
    pub items_bucket: String,
    pub avatars_bucket: String,
    /// Serve the demo dataset for items and categories when everything else fails.
    pub mock_data: bool,
}

impl Default for FacadeOptions {
    fn default() -> Self {
        Self {
            items_bucket: "items".to_string(),
            avatars_bucket: "avatars".to_string(),
            mock_data: true,
        }
    }
}

pub struct StyleSync {
    ports: Ports,
    options: FacadeOptions,
    cache: LocalCache,
    categories: FallbackChain<Category>,
    items: FallbackChain<Item>,
    outfits: FallbackChain<Outfit>,
    events: FallbackChain<Event>,
}

fn owned_sources<R: LocalRecord>(ports: &Ports, cache: &LocalCache) -> Vec<Arc<dyn DataSource<R>>> {
    vec![
        Arc::new(RemoteSource::<R>::new(ports.rows.clone())),
        Arc::new(LocalSource::<R>::new(cache.clone())),
    ]
}

impl StyleSync {
    pub fn new(ports: Ports, options: FacadeOptions) -> Self {
        let cache = LocalCache::new(ports.local.clone());
        let now = Utc::now();

        let mut categories: Vec<Arc<dyn DataSource<Category>>> =
            vec![Arc::new(RemoteSource::<Category>::new(ports.rows.clone()))];
        let mut items = owned_sources::<Item>(&ports, &cache);
        if options.mock_data {
            categories.push(Arc::new(MockSource::new(mock::categories(now))));
            items.push(Arc::new(MockSource::new(mock::items(now))));
        }

        Self {
            categories: FallbackChain::new(categories),
            items: FallbackChain::new(items),
            outfits: FallbackChain::new(owned_sources::<Outfit>(&ports, &cache)),
            events: FallbackChain::new(owned_sources::<Event>(&ports, &cache)),
            ports,
            options,
            cache,
        }
    }

    pub fn users(&self) -> UsersApi<'_> {
        UsersApi { app: self }
    }

    pub fn categories(&self) -> CategoriesApi<'_> {
        CategoriesApi { app: self }
    }

    pub fn items(&self) -> ItemsApi<'_> {
        ItemsApi { app: self }
    }

    pub fn outfits(&self) -> OutfitsApi<'_> {
        OutfitsApi { app: self }
    }

    pub fn events(&self) -> EventsApi<'_> {
        EventsApi { app: self }
    }

    pub fn boards(&self) -> BoardsApi<'_> {
        BoardsApi { app: self }
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi { app: self }
    }

    pub fn diagnostics(&self) -> DiagnosticsApi<'_> {
        DiagnosticsApi { app: self }
    }

    pub fn options(&self) -> &FacadeOptions {
        &self.options
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    // ── Direct backend access (no fallback) ────────────────────────────────

    async fn select_rows<T: DeserializeOwned>(&self, query: &Query) -> Result<Vec<T>> {
        let rows = self
            .ports
            .rows
            .select(query)
            .await
            .map_err(|e| AppError::operation(&format!("read {}", query.table), e))?;
        rows.into_iter().map(|row| Ok(serde_json::from_value(row)?)).collect()
    }

    async fn insert_row<T: DeserializeOwned>(&self, table: Table, row: Value, joins: &[Join]) -> Result<T> {
        let stored = self
            .ports
            .rows
            .insert(table, row, joins)
            .await
            .map_err(|e| AppError::operation(&format!("create {table}"), e))?;
        Ok(serde_json::from_value(stored)?)
    }

    /// Updates row `id` if it also satisfies `scope`.
    async fn update_row<T: DeserializeOwned>(
        &self,
        table: Table,
        id: &str,
        scope: &[Filter],
        patch: &impl Serialize,
        joins: &[Join],
    ) -> Result<T> {
        let patch = serde_json::to_value(patch)?;
        let stored = self
            .ports
            .rows
            .update(table, id, scope, patch, joins)
            .await
            .map_err(|e| AppError::operation(&format!("update {table} {id}"), e))?
            .ok_or_else(|| AppError::not_found(table.entity(), id))?;
        Ok(serde_json::from_value(stored)?)
    }

    async fn delete_row(&self, table: Table, id: &str, scope: &[Filter]) -> Result<()> {
        let deleted = self
            .ports
            .rows
            .delete(table, id, scope)
            .await
            .map_err(|e| AppError::operation(&format!("delete {table} {id}"), e))?;
        if !deleted {
            return Err(AppError::not_found(table.entity(), id));
        }
        Ok(())
    }

    /// Updates one of `owner`'s items, outfits or events.
    async fn update_owned<R: LocalRecord>(&self, owner: &str, id: &str, patch: &impl Serialize) -> Result<R> {
        if is_local_id(id) {
            let patch = serde_json::to_value(patch)?;
            return self
                .cache
                .update::<R>(owner, id, &patch)
                .await
                .ok_or_else(|| AppError::not_found(R::TABLE.entity(), id));
        }
        self.update_row(R::TABLE, id, &[Filter::owned_by(owner)], patch, &R::joins()).await
    }

    /// Deletes one of `owner`'s items, outfits or events.
    async fn delete_owned<R: LocalRecord>(&self, owner: &str, id: &str) -> Result<()> {
        if is_local_id(id) {
            if !self.cache.remove::<R>(owner, id).await {
                return Err(AppError::not_found(R::TABLE.entity(), id));
            }
            return Ok(());
        }
        self.delete_row(R::TABLE, id, &[Filter::owned_by(owner)]).await
    }
}

/// Rejects blank required fields before anything is sent.
pub(crate) fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    Ok(())
}
