use super::StyleSync;
use crate::record::RecordFilter;
use ss_core::models::Category;

pub struct CategoriesApi<'a> {
    pub(super) app: &'a StyleSync,
}

impl CategoriesApi<'_> {
    /// All categories ordered by name. Categories are shared, so no owner is needed.
    pub async fn list(&self) -> Vec<Category> {
        self.app.categories.fetch("", &RecordFilter::All).await
    }
}
