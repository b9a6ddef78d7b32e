use std::collections::HashMap;
use std::path::Path;

use konflikt_core::service::{build_merge, FieldChoice};
use konflikt_core::{ConflictRecord, Record};
use serde_json::Value;

use crate::commands::common::{
    normalize_conflict_identifier, open_database, open_service, resolve_conflict_id, CliContext,
};
use crate::error::CliError;

pub fn run_merge(
    id: &str,
    remote_fields: &[String],
    patch_path: Option<&Path>,
    context: &CliContext,
) -> Result<Record, CliError> {
    let normalized_id = normalize_conflict_identifier(id)?;
    let db = open_database(&context.db_path)?;
    let mut service = open_service(&db, &context.config);
    let conflict_id = resolve_conflict_id(&normalized_id, &service)?;
    let conflict = service
        .get_conflict(&conflict_id)
        .ok_or_else(|| CliError::ConflictNotFound(normalized_id.clone()))?;

    let mut merged = build_merge(conflict, &remote_choices(conflict, remote_fields)?);
    if let Some(path) = patch_path {
        merged.extend(read_patch(path)?);
    }

    let record = service.resolve_manual_merge(&conflict_id, merged)?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(record)
}

/// Per-field choices selecting the remote value for each named field.
pub fn remote_choices(
    conflict: &ConflictRecord,
    remote_fields: &[String],
) -> Result<HashMap<String, FieldChoice>, CliError> {
    remote_fields
        .iter()
        .map(|field| {
            let field = field.trim();
            if conflict
                .conflicting_fields
                .iter()
                .any(|diff| diff.field == field)
            {
                Ok((field.to_string(), FieldChoice::Remote))
            } else {
                Err(CliError::UnknownField(field.to_string()))
            }
        })
        .collect()
}

pub fn read_patch(path: &Path) -> Result<Record, CliError> {
    let raw = std::fs::read_to_string(path)?;
    match serde_json::from_str::<Value>(&raw)? {
        Value::Object(patch) => Ok(patch),
        _ => Err(CliError::InvalidPatch(path.display().to_string())),
    }
}
