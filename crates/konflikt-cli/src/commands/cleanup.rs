use crate::commands::common::{open_database, open_service, CliContext};
use crate::error::CliError;

pub fn run_cleanup(older_than_days: Option<u32>, context: &CliContext) -> Result<usize, CliError> {
    let db = open_database(&context.db_path)?;
    let mut service = open_service(&db, &context.config);

    let removed = match older_than_days {
        Some(days) => service.clear_resolved_conflicts(days),
        None => service.clear_expired_conflicts(),
    };

    println!("Removed {removed} resolved conflicts");
    Ok(removed)
}
