use konflikt_core::Record;

use crate::cli::Side;
use crate::commands::common::{
    normalize_conflict_identifier, open_database, open_service, resolve_conflict_id, CliContext,
};
use crate::error::CliError;

pub fn run_resolve(id: &str, side: Side, context: &CliContext) -> Result<Record, CliError> {
    let normalized_id = normalize_conflict_identifier(id)?;
    let db = open_database(&context.db_path)?;
    let mut service = open_service(&db, &context.config);
    let conflict_id = resolve_conflict_id(&normalized_id, &service)?;

    let record = match side {
        Side::Local => service.resolve_keep_local(&conflict_id)?,
        Side::Remote => service.resolve_keep_remote(&conflict_id)?,
    };

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(record)
}

pub fn run_resolve_all(side: Side, context: &CliContext) -> Result<usize, CliError> {
    let db = open_database(&context.db_path)?;
    let mut service = open_service(&db, &context.config);

    let count = match side {
        Side::Local => service.resolve_all_keep_local(),
        Side::Remote => service.resolve_all_keep_remote(),
    };

    println!("Resolved {count} conflicts");
    Ok(count)
}
