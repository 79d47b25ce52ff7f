//! Wardrobe items: catalogue reads, CRUD, favourites, image upload and search.

use super::{require, StyleSync};
use crate::record::RecordFilter;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use ss_core::error::Result;
use ss_core::models::{ImageUpload, Item, ItemUpdate, NewItem};
use tracing::{info, warn};

pub struct ItemsApi<'a> {
    pub(super) app: &'a StyleSync,
}

impl ItemsApi<'_> {
    /// The owner's items, newest first, with their category attached.
    pub async fn list(&self, owner: &str) -> Vec<Item> {
        self.app.items.fetch(owner, &RecordFilter::All).await
    }

    pub async fn list_by_category(&self, owner: &str, category_id: &str) -> Vec<Item> {
        self.app.items.fetch(owner, &RecordFilter::Category(category_id.to_string())).await
    }

    pub async fn list_favorites(&self, owner: &str) -> Vec<Item> {
        self.app.items.fetch(owner, &RecordFilter::Favorites).await
    }

    /// Creates an item. Falls back to a local record when the backend is
    /// unreachable.
    pub async fn create(&self, owner: &str, draft: NewItem) -> Result<Item> {
        require("name", &draft.name)?;
        require("category", draft.category_id.as_deref().unwrap_or_default())?;
        self.app.items.create(owner, serde_json::to_value(&draft)?).await
    }

    pub async fn update(&self, owner: &str, id: &str, patch: ItemUpdate) -> Result<Item> {
        self.app.update_owned(owner, id, &patch).await
    }

    pub async fn set_favorite(&self, owner: &str, id: &str, favorite: bool) -> Result<Item> {
        self.update(owner, id, ItemUpdate { is_favorite: Some(favorite), ..Default::default() }).await
    }

    pub async fn delete(&self, owner: &str, id: &str) -> Result<()> {
        self.app.delete_owned::<Item>(owner, id).await
    }

    /// Stores an item photo and returns the URL to save on the item.
    ///
    /// When the items bucket is missing, or the upload fails, the image is
    /// returned inline as a `data:` URI instead.
    pub async fn upload_image(&self, owner: &str, upload: ImageUpload) -> String {
        let bucket = &self.app.options.items_bucket;
        let mime = content_type(&upload);

        match self.app.ports.objects.list_buckets().await {
            Ok(buckets) if buckets.iter().any(|b| b == bucket) => {}
            Ok(_) => {
                warn!(bucket = %bucket, "Storage bucket missing, embedding image inline");
                return data_uri(&mime, &upload.data);
            }
            Err(e) => {
                warn!(bucket = %bucket, error = %format!("{e:#}"), "Could not list storage buckets, embedding image inline");
                return data_uri(&mime, &upload.data);
            }
        }

        let path = format!("items/{}-{}.{}", owner, Utc::now().timestamp_millis(), upload.extension());
        match self.app.ports.objects.upload(bucket, &path, upload.data.clone(), &mime).await {
            Ok(stored) => {
                info!(bucket = %bucket, path = %stored, "Item image uploaded");
                self.app.ports.objects.public_url(bucket, &stored)
            }
            Err(e) => {
                warn!(bucket = %bucket, error = %format!("{e:#}"), "Image upload failed, embedding image inline");
                data_uri(&mime, &upload.data)
            }
        }
    }

    /// Case-insensitive match of `query` against name, brand and colour,
    /// optionally narrowed to one category. A blank query matches everything.
    pub async fn search(&self, owner: &str, query: &str, category_id: Option<&str>) -> Vec<Item> {
        let items = match category_id {
            Some(category) => self.list_by_category(owner, category).await,
            None => self.list(owner).await,
        };
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return items;
        }
        items.into_iter().filter(|item| matches_query(item, &needle)).collect()
    }
}

fn matches_query(item: &Item, needle: &str) -> bool {
    [Some(&item.name), item.brand.as_ref(), item.color.as_ref()]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(needle))
}

pub(crate) fn content_type(upload: &ImageUpload) -> String {
    upload
        .content_type
        .clone()
        .filter(|ct| !ct.trim().is_empty())
        .or_else(|| mime_guess::from_path(&upload.file_name).first().map(|m| m.to_string()))
        .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string())
}

pub(crate) fn data_uri(mime: &str, data: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(data))
}
