//! Client-side shaping of backend collections: columns, filtering, sorting.
//!
//! Rows are the JSON objects the backend returns; nothing here knows their
//! schema.

use std::cmp::Ordering;

use serde_json::Value;

/// Column names in first-seen order across all rows.
pub fn columns(rows: &[Value]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for row in rows {
        if let Value::Object(map) = row {
            for key in map.keys() {
                if !seen.iter().any(|k| k == key) {
                    seen.push(key.clone());
                }
            }
        }
    }
    seen
}

/// Display text for a cell. Nested objects show their `nombre` when they
/// have one (e.g. `{"id": 3, "nombre": "Cardiología"}`).
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(true) => "Sí".to_string(),
        Value::Bool(false) => "No".to_string(),
        Value::Number(n) => n.to_string(),
        Value::Object(map) => match map.get("nombre") {
            Some(Value::String(name)) => name.clone(),
            _ => value.to_string(),
        },
        Value::Array(items) => items.iter().map(cell_text).collect::<Vec<_>>().join(", "),
    }
}

/// Rows with any cell containing `query` (case-insensitive). Blank matches all.
pub fn filter_rows<'a>(rows: &'a [Value], query: &str) -> Vec<&'a Value> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return rows.iter().collect();
    }

    rows.iter()
        .filter(|row| match row {
            Value::Object(map) => map
                .values()
                .any(|cell| cell_text(cell).to_lowercase().contains(&needle)),
            other => cell_text(other).to_lowercase().contains(&needle),
        })
        .collect()
}

/// Stable sort by `column`. Numbers compare numerically, everything else by
/// display text; missing cells sort last in either direction.
pub fn sort_rows(rows: &mut [&Value], column: &str, ascending: bool) {
    rows.sort_by(|a, b| {
        match (a.get(column), b.get(column)) {
            (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
            (None | Some(Value::Null), _) => Ordering::Greater,
            (_, None | Some(Value::Null)) => Ordering::Less,
            (Some(x), Some(y)) => {
                let ord = match (x.as_f64(), y.as_f64()) {
                    (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                    _ => cell_text(x).to_lowercase().cmp(&cell_text(y).to_lowercase()),
                };
                if ascending { ord } else { ord.reverse() }
            }
        }
    });
}
