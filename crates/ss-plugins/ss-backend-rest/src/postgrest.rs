//! Translation of backend-neutral queries into PostgREST query strings.

use serde_json::Value;
use ss_core::query::{Filter, Join, Query};

/// The `select` parameter: all columns plus one embedded resource per join.
pub fn select_clause(joins: &[Join]) -> String {
    let mut select = String::from("*");
    for join in joins {
        let columns = if join.columns.is_empty() { "*".to_string() } else { join.columns.join(",") };
        select.push_str(&format!(",{}:{}({})", join.alias, join.table, columns));
    }
    select
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// List members holding reserved characters are double-quoted.
fn list_member(value: &Value) -> String {
    let raw = scalar(value);
    if raw.contains([',', '(', ')', '"', ' ']) {
        format!("\"{}\"", raw.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        raw
    }
}

fn filter_param(filter: &Filter) -> (String, String) {
    match filter {
        Filter::Eq(column, value) => (column.clone(), format!("eq.{}", scalar(value))),
        Filter::Gte(column, value) => (column.clone(), format!("gte.{}", scalar(value))),
        Filter::In(column, values) => {
            let members: Vec<String> = values.iter().map(list_member).collect();
            (column.clone(), format!("in.({})", members.join(",")))
        }
    }
}

/// Filters addressing one row by id, narrowed by `scope`.
pub fn target_params(id: &str, scope: &[Filter]) -> Vec<(String, String)> {
    let mut params = vec![("id".to_string(), format!("eq.{id}"))];
    params.extend(scope.iter().map(filter_param));
    params
}

/// Query-string pairs for a read, in a stable order.
pub fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), select_clause(&query.joins))];
    params.extend(query.filters.iter().map(filter_param));
    if let Some(order) = &query.order {
        let direction = if order.ascending { "asc" } else { "desc" };
        params.push(("order".to_string(), format!("{}.{}", order.column, direction)));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}
