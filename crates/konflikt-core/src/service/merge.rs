//! Field-by-field merge selection

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{ConflictRecord, Record};

/// Which side supplies a conflicting field's value in a manual merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldChoice {
    #[default]
    Local,
    Remote,
}

/// Build a manual-merge payload from per-field choices.
///
/// Every conflicting field is included; fields without a choice take the
/// local value. A chosen side without a value contributes `null`.
pub fn build_merge(conflict: &ConflictRecord, choices: &HashMap<String, FieldChoice>) -> Record {
    conflict
        .conflicting_fields
        .iter()
        .map(|diff| {
            let value = match choices.get(&diff.field).copied().unwrap_or_default() {
                FieldChoice::Local => diff.local_value.clone(),
                FieldChoice::Remote => diff.remote_value.clone(),
            };
            (diff.field.clone(), value.unwrap_or(Value::Null))
        })
        .collect()
}
