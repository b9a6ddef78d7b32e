//! Field-level conflict detection between two record snapshots

mod compare;

pub use compare::values_equal;

use serde::Serialize;

use crate::models::{record_timestamp, FieldDiff, Record};

/// Identity and provenance fields that never count as a divergence
pub const IGNORED_FIELDS: [&str; 3] = ["user_id", "created_at", "id"];

/// Outcome of comparing a local and a remote snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictReport {
    pub has_conflict: bool,
    pub fields: Vec<FieldDiff>,
}

/// Compare two snapshots of the same record field by field.
///
/// A missing side means there is nothing to reconcile yet and yields an
/// empty report. Fields are visited in local order, then remote-only fields
/// in remote order.
#[must_use]
pub fn detect_conflict(
    table: &str,
    local: Option<&Record>,
    remote: Option<&Record>,
) -> ConflictReport {
    let (Some(local), Some(remote)) = (local, remote) else {
        return ConflictReport::default();
    };

    let local_timestamp = record_timestamp(local);
    let remote_timestamp = record_timestamp(remote);

    let remote_only = remote.keys().filter(|field| !local.contains_key(*field));
    let fields = local
        .keys()
        .chain(remote_only)
        .filter(|field| !IGNORED_FIELDS.contains(&field.as_str()))
        .filter_map(|field| {
            let local_value = local.get(field);
            let remote_value = remote.get(field);
            if values_equal(local_value, remote_value) {
                return None;
            }
            Some(FieldDiff {
                field: field.clone(),
                local_value: local_value.cloned(),
                remote_value: remote_value.cloned(),
                local_timestamp: local_timestamp.clone(),
                remote_timestamp: remote_timestamp.clone(),
            })
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        table,
        divergent_fields = fields.len(),
        "Compared record snapshots"
    );

    ConflictReport {
        has_conflict: !fields.is_empty(),
        fields,
    }
}
