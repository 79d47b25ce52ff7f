//! # Row Queries
//!
//! A backend-neutral description of a row read: table, filters, ordering,
//! limit, and many-to-one joins. Backends translate it into their own
//! dialect (PostgREST query strings, in-memory scans).

use serde_json::Value;
use std::fmt;

/// Tables exposed by the hosted backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Users,
    Categories,
    Items,
    Outfits,
    Events,
    Boards,
    BoardItems,
}

impl Table {
    pub const ALL: [Table; 7] = [
        Table::Users,
        Table::Categories,
        Table::Items,
        Table::Outfits,
        Table::Events,
        Table::Boards,
        Table::BoardItems,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::Categories => "categories",
            Table::Items => "items",
            Table::Outfits => "outfits",
            Table::Events => "events",
            Table::Boards => "boards",
            Table::BoardItems => "board_items",
        }
    }

    /// Singular name used in error messages.
    pub fn entity(&self) -> &'static str {
        match self {
            Table::Users => "User",
            Table::Categories => "Category",
            Table::Items => "Item",
            Table::Outfits => "Outfit",
            Table::Events => "Event",
            Table::Boards => "Board",
            Table::BoardItems => "Board item",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    Gte(String, Value),
    In(String, Vec<Value>),
}

impl Filter {
    /// `user_id = owner`
    pub fn owned_by(owner: &str) -> Self {
        Filter::Eq("user_id".to_string(), Value::String(owner.to_string()))
    }

    pub fn column(&self) -> &str {
        match self {
            Filter::Eq(c, _) | Filter::Gte(c, _) | Filter::In(c, _) => c,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// A many-to-one expansion: `row[local_key]` points at `table.id`, and the
/// matched row is attached to the result under `alias`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub alias: &'static str,
    pub table: Table,
    pub local_key: &'static str,
    /// Columns to keep from the joined row; empty means all.
    pub columns: Vec<&'static str>,
}

impl Join {
    pub fn new(alias: &'static str, table: Table, local_key: &'static str) -> Self {
        Self { alias, table, local_key, columns: Vec::new() }
    }

    pub fn columns(mut self, columns: &[&'static str]) -> Self {
        self.columns = columns.to_vec();
        self
    }

    /// `item.category_id → categories`
    pub fn item_category() -> Self {
        Self::new("category", Table::Categories, "category_id")
    }

    /// `event.outfit_id → outfits`
    pub fn event_outfit() -> Self {
        Self::new("outfit", Table::Outfits, "outfit_id")
    }

    /// `board.user_id → users (full_name, avatar_url)`
    pub fn board_owner() -> Self {
        Self::new("user", Table::Users, "user_id").columns(&["full_name", "avatar_url"])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: Table,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
    pub joins: Vec<Join>,
}

impl Query {
    pub fn from(table: Table) -> Self {
        Self { table, filters: Vec::new(), order: None, limit: None, joins: Vec::new() }
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq(column.to_string(), value.into()));
        self
    }

    pub fn gte(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Gte(column.to_string(), value.into()));
        self
    }

    pub fn is_in<V: Into<Value>>(mut self, column: &str, values: impl IntoIterator<Item = V>) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.filters.push(Filter::In(column.to_string(), values));
        self
    }

    pub fn order_asc(mut self, column: &str) -> Self {
        self.order = Some(Order { column: column.to_string(), ascending: true });
        self
    }

    pub fn order_desc(mut self, column: &str) -> Self {
        self.order = Some(Order { column: column.to_string(), ascending: false });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    pub fn joins(mut self, joins: &[Join]) -> Self {
        self.joins.extend(joins.iter().cloned());
        self
    }
}
