use super::StyleSync;
use super::items::content_type;
use crate::record::RecordFilter;
use chrono::Utc;
use ss_core::error::{AppError, Result};
use ss_core::models::{ImageUpload, ProfileStats, ProfileUpdate, User};
use ss_core::query::{Query, Table};
use tracing::info;

pub struct UsersApi<'a> {
    pub(super) app: &'a StyleSync,
}

impl UsersApi<'_> {
    pub async fn get_profile(&self, user_id: &str) -> Result<User> {
        let query = Query::from(Table::Users).eq("id", user_id).limit(1);
        self.app
            .select_rows::<User>(&query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::not_found("User", user_id))
    }

    pub async fn update_profile(&self, user_id: &str, patch: ProfileUpdate) -> Result<User> {
        self.app.update_row(Table::Users, user_id, &[], &patch, &[]).await
    }

    /// Uploads a profile picture and returns its public URL. Unlike item
    /// images there is no inline fallback.
    pub async fn upload_avatar(&self, user_id: &str, upload: ImageUpload) -> Result<String> {
        let bucket = &self.app.options.avatars_bucket;
        let path = format!("avatars/{}-{}.{}", user_id, Utc::now().timestamp_millis(), upload.extension());
        let mime = content_type(&upload);
        let stored = self
            .app
            .ports
            .objects
            .upload(bucket, &path, upload.data, &mime)
            .await
            .map_err(|e| AppError::operation("upload avatar", e))?;
        info!(user_id, path = %stored, "Avatar uploaded");
        Ok(self.app.ports.objects.public_url(bucket, &stored))
    }

    /// Counters for the profile page, fetched concurrently.
    pub async fn stats(&self, user_id: &str) -> ProfileStats {
        let (items, outfits, starred, events) = tokio::join!(
            self.app.items.fetch(user_id, &RecordFilter::All),
            self.app.outfits.fetch(user_id, &RecordFilter::All),
            self.app.outfits.fetch(user_id, &RecordFilter::Starred),
            self.app.events.fetch(user_id, &RecordFilter::All),
        );
        ProfileStats {
            items: items.len(),
            outfits: outfits.len(),
            starred: starred.len(),
            events: events.len(),
        }
    }
}
