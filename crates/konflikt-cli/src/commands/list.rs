use crate::commands::common::{
    conflict_to_list_item, format_conflict_lines, open_database, open_service, CliContext,
    ConflictListItem,
};
use crate::error::CliError;

pub fn run_list(as_json: bool, context: &CliContext) -> Result<(), CliError> {
    let db = open_database(&context.db_path)?;
    let service = open_service(&db, &context.config);
    let pending = service.get_pending_conflicts();

    if as_json {
        let json_items = pending
            .iter()
            .map(|conflict| conflict_to_list_item(conflict))
            .collect::<Vec<ConflictListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else if pending.is_empty() {
        println!("No pending conflicts");
    } else {
        for line in format_conflict_lines(&pending) {
            println!("{line}");
        }
    }

    Ok(())
}
