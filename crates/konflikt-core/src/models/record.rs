//! Schema-less business records
//!
//! Invoices, customers and orders all travel through the engine as plain
//! field maps, so nothing here assumes a concrete schema.

use serde_json::{Map, Value};

/// A business record as an ordered field map.
pub type Record = Map<String, Value>;

/// Placeholder title for records without any label-bearing field.
pub const UNKNOWN_RECORD_TITLE: &str = "Unbekannter Datensatz";

/// Label-bearing fields, in lookup order.
const TITLE_FIELDS: [&str; 7] = [
    "name",
    "title",
    "nummer",
    "po_nummer",
    "description",
    "bezeichnung",
    "id",
];

/// Derive a human-readable label for a record pair.
///
/// The local side is preferred; the remote side is only consulted when the
/// local record is absent.
#[must_use]
pub fn derive_record_title(local: Option<&Record>, remote: Option<&Record>) -> String {
    let Some(record) = local.or(remote) else {
        return UNKNOWN_RECORD_TITLE.to_string();
    };

    TITLE_FIELDS
        .iter()
        .find_map(|field| record.get(*field).and_then(label_text))
        .unwrap_or_else(|| UNKNOWN_RECORD_TITLE.to_string())
}

/// Contextual timestamp of a record: `updated_at`, else `created_at`.
#[must_use]
pub fn record_timestamp(record: &Record) -> Option<Value> {
    ["updated_at", "created_at"]
        .iter()
        .filter_map(|field| record.get(*field))
        .find(|value| is_truthy(value))
        .cloned()
}

/// Identifier of a record as text, accepting string and numeric ids.
#[must_use]
pub fn record_id(record: &Record) -> Option<String> {
    match record.get("id")? {
        Value::String(id) if !id.trim().is_empty() => Some(id.trim().to_string()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn label_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) if number.as_f64().is_some_and(|n| n != 0.0) => {
            Some(number.to_string())
        }
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::String(text) => !text.is_empty(),
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::Array(_) | Value::Object(_) => true,
    }
}
