use chrono::DateTime;
use konflikt_core::models::record_id;
use konflikt_core::service::OutboxEntry;

use crate::commands::common::{format_timestamp, open_database, open_service, CliContext};
use crate::error::CliError;

pub fn run_outbox(as_json: bool, clear: bool, context: &CliContext) -> Result<(), CliError> {
    let db = open_database(&context.db_path)?;
    let mut service = open_service(&db, &context.config);

    if clear {
        let count = service.clear_outbox()?;
        println!("Cleared {count} queued records");
        return Ok(());
    }

    let entries = service.pending_outbox();
    if as_json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else if entries.is_empty() {
        println!("Outbox is empty");
    } else {
        for line in format_outbox_lines(&entries) {
            println!("{line}");
        }
    }

    Ok(())
}

pub fn format_outbox_lines(entries: &[OutboxEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| {
            let queued_at = DateTime::from_timestamp_millis(entry.timestamp)
                .map_or_else(|| entry.timestamp.to_string(), format_timestamp);
            let id = record_id(&entry.data).unwrap_or_else(|| "-".to_string());
            format!("{queued_at}  upsert  {}/{id}", entry.table)
        })
        .collect()
}
