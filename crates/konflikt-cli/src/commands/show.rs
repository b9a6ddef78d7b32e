use konflikt_core::ConflictRecord;
use serde_json::Value;

use crate::commands::common::{
    format_timestamp, normalize_conflict_identifier, open_database, open_service,
    resolve_conflict_id, CliContext,
};
use crate::error::CliError;

pub fn run_show(id: &str, as_json: bool, context: &CliContext) -> Result<(), CliError> {
    let normalized_id = normalize_conflict_identifier(id)?;
    let db = open_database(&context.db_path)?;
    let service = open_service(&db, &context.config);
    let conflict_id = resolve_conflict_id(&normalized_id, &service)?;
    let conflict = service
        .get_conflict(&conflict_id)
        .ok_or_else(|| CliError::ConflictNotFound(normalized_id.clone()))?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(conflict)?);
    } else {
        for line in format_conflict_detail(conflict) {
            println!("{line}");
        }
    }

    Ok(())
}

pub fn format_conflict_detail(conflict: &ConflictRecord) -> Vec<String> {
    let mut lines = vec![
        format!("{}  {}", conflict.id, conflict.record_title),
        format!("record:   {}/{}", conflict.table, conflict.record_id),
        format!("detected: {}", format_timestamp(conflict.detected_at)),
    ];
    match (conflict.resolution, conflict.resolved_at) {
        (Some(resolution), Some(at)) => {
            lines.push(format!("resolved: {} ({resolution})", format_timestamp(at)));
        }
        _ => lines.push("status:   pending".to_string()),
    }

    let width = conflict
        .conflicting_fields
        .iter()
        .map(|diff| diff.field.chars().count())
        .max()
        .unwrap_or(0);
    for diff in &conflict.conflicting_fields {
        lines.push(format!(
            "  {:<width$}  local={}  remote={}",
            diff.field,
            render_value(diff.local_value.as_ref()),
            render_value(diff.remote_value.as_ref())
        ));
    }

    lines
}

fn render_value(value: Option<&Value>) -> String {
    value.map_or_else(|| "(missing)".to_string(), Value::to_string)
}
