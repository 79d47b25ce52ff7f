//! Typed view over the backend tables that take part in the fallback chain.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use ss_core::models::{Category, Event, Item, Outfit};
use ss_core::query::{Join, Query, Table};
use ss_core::traits::LocalKey;

/// Read filters shared by every data source. Remote sources translate them
/// into query filters; local and mock sources evaluate them in memory.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordFilter {
    All,
    Category(String),
    /// Items in any of the listed categories. An empty list means no filter.
    Categories(Vec<String>),
    Favorites,
    Starred,
    Upcoming { from: NaiveDate, limit: usize },
}

impl RecordFilter {
    pub fn limit(&self) -> Option<usize> {
        match self {
            RecordFilter::Upcoming { limit, .. } => Some(*limit),
            _ => None,
        }
    }

    pub(crate) fn apply(&self, query: Query) -> Query {
        match self {
            RecordFilter::All => query,
            RecordFilter::Category(id) => query.eq("category_id", id.as_str()),
            RecordFilter::Categories(ids) if ids.is_empty() => query,
            RecordFilter::Categories(ids) => query.is_in("category_id", ids.iter().map(String::as_str)),
            RecordFilter::Favorites => query.eq("is_favorite", true),
            RecordFilter::Starred => query.eq("is_starred", true),
            RecordFilter::Upcoming { from, limit } => {
                query.gte("date", from.format("%Y-%m-%d").to_string()).limit(*limit)
            }
        }
    }
}

pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const TABLE: Table;
    /// Whether rows are scoped by `user_id`.
    const OWNED: bool = true;
    const ORDER_COLUMN: &'static str = "created_at";
    const ORDER_ASCENDING: bool = false;

    fn id(&self) -> &str;

    /// `None` for shared reference data.
    fn owner(&self) -> Option<&str>;

    fn joins() -> Vec<Join> {
        Vec::new()
    }

    fn matches(&self, filter: &RecordFilter) -> bool;

    /// Sorts in the same order the remote query asks for.
    fn sort(records: &mut [Self]);

    fn query(owner: &str, filter: &RecordFilter) -> Query {
        let mut query = Query::from(Self::TABLE).joins(&Self::joins());
        if Self::OWNED {
            query = query.eq("user_id", owner);
        }
        query = if Self::ORDER_ASCENDING {
            query.order_asc(Self::ORDER_COLUMN)
        } else {
            query.order_desc(Self::ORDER_COLUMN)
        };
        filter.apply(query)
    }
}

/// Records that have a collection in the local fallback store.
pub trait LocalRecord: Record {
    const LOCAL_KEY: LocalKey;
}

/// Filters, sorts and truncates an in-memory collection.
pub fn select<R: Record>(records: impl IntoIterator<Item = R>, filter: &RecordFilter) -> Vec<R> {
    let mut out: Vec<R> = records.into_iter().filter(|r| r.matches(filter)).collect();
    R::sort(&mut out);
    if let Some(limit) = filter.limit() {
        out.truncate(limit);
    }
    out
}

impl Record for Category {
    const TABLE: Table = Table::Categories;
    const OWNED: bool = false;
    const ORDER_COLUMN: &'static str = "name";
    const ORDER_ASCENDING: bool = true;

    fn id(&self) -> &str {
        &self.id
    }

    fn owner(&self) -> Option<&str> {
        None
    }

    fn matches(&self, filter: &RecordFilter) -> bool {
        matches!(filter, RecordFilter::All)
    }

    fn sort(records: &mut [Self]) {
        records.sort_by(|a, b| a.name.cmp(&b.name));
    }
}

impl Record for Item {
    const TABLE: Table = Table::Items;

    fn id(&self) -> &str {
        &self.id
    }

    fn owner(&self) -> Option<&str> {
        Some(&self.user_id)
    }

    fn joins() -> Vec<Join> {
        vec![Join::item_category()]
    }

    fn matches(&self, filter: &RecordFilter) -> bool {
        match filter {
            RecordFilter::All => true,
            RecordFilter::Category(id) => self.category_id.as_deref() == Some(id.as_str()),
            RecordFilter::Categories(ids) => {
                ids.is_empty() || self.category_id.as_ref().is_some_and(|c| ids.contains(c))
            }
            RecordFilter::Favorites => self.is_favorite,
            RecordFilter::Starred | RecordFilter::Upcoming { .. } => false,
        }
    }

    fn sort(records: &mut [Self]) {
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }
}

impl LocalRecord for Item {
    const LOCAL_KEY: LocalKey = LocalKey::Items;
}

impl Record for Outfit {
    const TABLE: Table = Table::Outfits;

    fn id(&self) -> &str {
        &self.id
    }

    fn owner(&self) -> Option<&str> {
        Some(&self.user_id)
    }

    fn matches(&self, filter: &RecordFilter) -> bool {
        match filter {
            RecordFilter::All => true,
            RecordFilter::Starred => self.is_starred,
            _ => false,
        }
    }

    fn sort(records: &mut [Self]) {
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }
}

impl LocalRecord for Outfit {
    const LOCAL_KEY: LocalKey = LocalKey::Outfits;
}

impl Record for Event {
    const TABLE: Table = Table::Events;
    const ORDER_COLUMN: &'static str = "date";
    const ORDER_ASCENDING: bool = true;

    fn id(&self) -> &str {
        &self.id
    }

    fn owner(&self) -> Option<&str> {
        Some(&self.user_id)
    }

    fn joins() -> Vec<Join> {
        vec![Join::event_outfit()]
    }

    fn matches(&self, filter: &RecordFilter) -> bool {
        match filter {
            RecordFilter::All => true,
            RecordFilter::Upcoming { from, .. } => self.date >= *from,
            _ => false,
        }
    }

    fn sort(records: &mut [Self]) {
        records.sort_by(|a, b| a.date.cmp(&b.date));
    }
}

impl LocalRecord for Event {
    const LOCAL_KEY: LocalKey = LocalKey::Events;
}

#[cfg(test)]
mod tests {
    use super::*;
    use ss_core::query::Filter;
    use serde_json::json;

    #[test]
    fn item_query_is_owner_scoped_newest_first() {
        let q = Item::query("u1", &RecordFilter::Favorites);
        assert_eq!(q.filters[0], Filter::Eq("user_id".into(), json!("u1")));
        assert_eq!(q.filters[1], Filter::Eq("is_favorite".into(), json!(true)));
        assert_eq!(q.order.as_ref().map(|o| o.ascending), Some(false));
        assert_eq!(q.joins, vec![Join::item_category()]);
    }

    #[test]
    fn categories_are_not_owner_scoped() {
        let q = Category::query("u1", &RecordFilter::All);
        assert!(q.filters.is_empty());
        assert_eq!(q.order.as_ref().map(|o| o.column.as_str()), Some("name"));
    }

    #[test]
    fn upcoming_limits_and_starts_at_date() {
        let from = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let q = Event::query("u1", &RecordFilter::Upcoming { from, limit: 3 });
        assert_eq!(q.filters[1], Filter::Gte("date".into(), json!("2026-10-19")));
        assert_eq!(q.limit, Some(3));
    }

    #[test]
    fn empty_category_list_does_not_filter() {
        let q = Item::query("u1", &RecordFilter::Categories(vec![]));
        assert_eq!(q.filters.len(), 1);
    }
}
