use crate::commands::common::{
    conflict_to_list_item, format_history_lines, open_database, open_service, CliContext,
    ConflictListItem,
};
use crate::error::CliError;

pub fn run_history(limit: usize, as_json: bool, context: &CliContext) -> Result<(), CliError> {
    let db = open_database(&context.db_path)?;
    let service = open_service(&db, &context.config);
    let history = service
        .get_conflict_history()
        .into_iter()
        .take(limit)
        .collect::<Vec<_>>();

    if as_json {
        let json_items = history
            .iter()
            .map(|conflict| conflict_to_list_item(conflict))
            .collect::<Vec<ConflictListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else if history.is_empty() {
        println!("No resolved conflicts");
    } else {
        for line in format_history_lines(&history) {
            println!("{line}");
        }
    }

    Ok(())
}
