//! Query evaluation over JSON rows held in memory.

use chrono::DateTime;
use serde_json::{Map, Value};
use ss_core::query::{Filter, Join, Order};
use std::cmp::Ordering;

/// Orders two JSON scalars. Timestamps are compared as instants so that
/// differing fractional-second precision does not skew the result.
pub(crate) fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(x), Value::String(y)) => {
            match (DateTime::parse_from_rfc3339(x), DateTime::parse_from_rfc3339(y)) {
                (Ok(x), Ok(y)) => Some(x.cmp(&y)),
                _ => Some(x.cmp(y)),
            }
        }
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

pub(crate) fn matches(row: &Value, filter: &Filter) -> bool {
    let cell = row.get(filter.column()).unwrap_or(&Value::Null);
    match filter {
        Filter::Eq(_, v) => cell == v,
        Filter::Gte(_, v) => matches!(compare(cell, v), Some(Ordering::Greater | Ordering::Equal)),
        Filter::In(_, vs) => vs.contains(cell),
    }
}

/// Sorts rows by the order column. Rows missing the column sort last.
pub(crate) fn sort(rows: &mut [Value], order: &Order) {
    rows.sort_by(|a, b| {
        let (x, y) = (a.get(&order.column), b.get(&order.column));
        match (x, y) {
            (Some(x), Some(y)) => {
                let ord = compare(x, y).unwrap_or(Ordering::Equal);
                if order.ascending { ord } else { ord.reverse() }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}

/// Attaches the joined row (or `null`) under `join.alias`.
pub(crate) fn attach(row: &mut Value, join: &Join, target: &[Value]) {
    let key = row.get(join.local_key).and_then(Value::as_str).map(str::to_owned);
    let joined = key
        .and_then(|key| target.iter().find(|t| t.get("id").and_then(Value::as_str) == Some(key.as_str())))
        .map(|t| project(t, &join.columns))
        .unwrap_or(Value::Null);
    if let Some(obj) = row.as_object_mut() {
        obj.insert(join.alias.to_string(), joined);
    }
}

fn project(row: &Value, columns: &[&'static str]) -> Value {
    if columns.is_empty() {
        return row.clone();
    }
    let mut out = Map::new();
    for column in columns {
        if let Some(v) = row.get(*column) {
            out.insert((*column).to_string(), v.clone());
        }
    }
    Value::Object(out)
}
