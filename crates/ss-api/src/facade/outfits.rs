use super::{require, StyleSync};
use crate::random;
use crate::record::RecordFilter;
use ss_core::error::{AppError, Result};
use ss_core::models::{Item, NewOutfit, Outfit, OutfitUpdate, OutfitWithItems};
use std::collections::HashMap;
use tracing::info;

pub struct OutfitsApi<'a> {
    pub(super) app: &'a StyleSync,
}

impl OutfitsApi<'_> {
    pub async fn list(&self, owner: &str) -> Vec<Outfit> {
        self.app.outfits.fetch(owner, &RecordFilter::All).await
    }

    pub async fn list_starred(&self, owner: &str) -> Vec<Outfit> {
        self.app.outfits.fetch(owner, &RecordFilter::Starred).await
    }

    pub async fn create(&self, owner: &str, draft: NewOutfit) -> Result<Outfit> {
        require("name", &draft.name)?;
        self.app.outfits.create(owner, serde_json::to_value(&draft)?).await
    }

    pub async fn update(&self, owner: &str, id: &str, patch: OutfitUpdate) -> Result<Outfit> {
        self.app.update_owned(owner, id, &patch).await
    }

    pub async fn set_starred(&self, owner: &str, id: &str, starred: bool) -> Result<Outfit> {
        self.update(owner, id, OutfitUpdate { is_starred: Some(starred), ..Default::default() }).await
    }

    pub async fn delete(&self, owner: &str, id: &str) -> Result<()> {
        self.app.delete_owned::<Outfit>(owner, id).await
    }

    /// Builds and saves an outfit with one random item per category.
    /// An empty `category_ids` draws from the whole wardrobe.
    pub async fn generate_random(&self, owner: &str, category_ids: &[String]) -> Result<Outfit> {
        let items = self
            .app
            .items
            .fetch(owner, &RecordFilter::Categories(category_ids.to_vec()))
            .await;
        if items.is_empty() {
            return Err(AppError::NoItems);
        }

        let draft = random::random_outfit(items, self.app.ports.random.as_ref(), StyleSync::today());
        info!(owner, picked = draft.items.len(), "Generated random outfit");
        self.create(owner, draft).await
    }

    /// The outfit's items in outfit order. References to items that no
    /// longer exist are skipped.
    pub fn resolve_items(outfit: &Outfit, wardrobe: &[Item]) -> Vec<Item> {
        let by_id: HashMap<&str, &Item> = wardrobe.iter().map(|i| (i.id.as_str(), i)).collect();
        outfit
            .items
            .iter()
            .filter_map(|id| by_id.get(id.as_str()).map(|item| (*item).clone()))
            .collect()
    }

    /// Starred outfits ready for display.
    pub async fn list_starred_with_items(&self, owner: &str) -> Vec<OutfitWithItems> {
        let (outfits, wardrobe) = tokio::join!(
            self.list_starred(owner),
            self.app.items.fetch(owner, &RecordFilter::All),
        );
        outfits
            .into_iter()
            .map(|outfit| {
                let resolved_items = Self::resolve_items(&outfit, &wardrobe);
                OutfitWithItems { outfit, resolved_items }
            })
            .collect()
    }
}
