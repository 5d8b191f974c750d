//! Audit log JSON diff computation
//!
//! Generates change records by comparing the JSON form of an entity before
//! and after an update. Floats use tolerance comparison to avoid
//! serialization precision noise (Decimal fields serialize as floats).

use serde::Serialize;
use serde_json::{Value, json};
use std::collections::HashSet;

/// Float comparison tolerance
const FLOAT_EPSILON: f64 = 1e-9;

/// Recursively compare two JSON values (floats with tolerance)
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(fa), Some(fb)) => (fa - fb).abs() < FLOAT_EPSILON,
            _ => a == b,
        },
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(va, vb)| values_equal(va, vb))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, va)| b.get(key).is_some_and(|vb| values_equal(va, vb)))
        }
        _ => false,
    }
}

/// One field change record
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub from: Value,
    pub to: Value,
}

/// Fields excluded from snapshots and diffs per resource type
fn excluded_fields(resource_type: &str) -> &'static [&'static str] {
    match resource_type {
        // Timestamps churn on every write and say nothing in a diff
        "booking" | "venue" | "wallet" | "menu_item" => &["id", "created_at", "updated_at"],
        _ => &["id"],
    }
}

/// Full snapshot of a resource for "created"-style audit details
pub fn create_snapshot<T: Serialize>(value: &T, resource_type: &str) -> Value {
    let mut snapshot = serde_json::to_value(value).unwrap_or(Value::Null);
    if let Value::Object(map) = &mut snapshot {
        for field in excluded_fields(resource_type) {
            map.remove(*field);
        }
    }
    json!({ "snapshot": snapshot })
}

/// Field-level diff of a resource for "updated"-style audit details
///
/// Only top-level fields are diffed; nested objects that differ are reported
/// as a whole-value change.
pub fn create_diff<T: Serialize>(old: &T, new: &T, resource_type: &str) -> Value {
    let old_value = serde_json::to_value(old).unwrap_or(Value::Null);
    let new_value = serde_json::to_value(new).unwrap_or(Value::Null);

    let (Value::Object(old_map), Value::Object(new_map)) = (&old_value, &new_value) else {
        return json!({ "changes": [] });
    };

    let excluded: HashSet<&str> = excluded_fields(resource_type).iter().copied().collect();
    let mut changes = Vec::new();

    let mut keys: Vec<&String> = old_map.keys().chain(new_map.keys()).collect();
    keys.sort();
    keys.dedup();

    for key in keys {
        if excluded.contains(key.as_str()) {
            continue;
        }
        let from = old_map.get(key).cloned().unwrap_or(Value::Null);
        let to = new_map.get(key).cloned().unwrap_or(Value::Null);
        if !values_equal(&from, &to) {
            changes.push(FieldChange {
                field: key.clone(),
                from,
                to,
            });
        }
    }

    json!({ "changes": changes })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Item {
        id: i64,
        name: String,
        price: f64,
        is_available: bool,
    }

    #[test]
    fn diff_reports_changed_fields_only() {
        let old = Item {
            id: 1,
            name: "Espresso".to_string(),
            price: 2.50,
            is_available: true,
        };
        let new = Item {
            id: 1,
            name: "Espresso".to_string(),
            price: 2.80,
            is_available: false,
        };

        let diff = create_diff(&old, &new, "menu_item");
        let changes = diff["changes"].as_array().unwrap();
        assert_eq!(changes.len(), 2);
        let fields: Vec<&str> = changes
            .iter()
            .map(|c| c["field"].as_str().unwrap())
            .collect();
        assert!(fields.contains(&"price"));
        assert!(fields.contains(&"is_available"));
    }

    #[test]
    fn diff_ignores_float_noise() {
        let old = Item {
            id: 1,
            name: "Tea".to_string(),
            price: 1.10,
            is_available: true,
        };
        let new = Item {
            id: 1,
            name: "Tea".to_string(),
            price: 1.10 + 1e-12,
            is_available: true,
        };
        let diff = create_diff(&old, &new, "menu_item");
        assert!(diff["changes"].as_array().unwrap().is_empty());
    }

    #[test]
    fn snapshot_strips_excluded_fields() {
        let item = Item {
            id: 9,
            name: "Cake".to_string(),
            price: 4.0,
            is_available: true,
        };
        let snapshot = create_snapshot(&item, "menu_item");
        assert!(snapshot["snapshot"].get("id").is_none());
        assert_eq!(snapshot["snapshot"]["name"], "Cake");
    }
}
