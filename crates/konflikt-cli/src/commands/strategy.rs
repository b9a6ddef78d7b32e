use konflikt_core::AutoResolveStrategy;

use crate::commands::common::{open_database, open_service, CliContext};
use crate::error::CliError;

pub fn run_strategy(
    strategy: Option<&str>,
    context: &CliContext,
) -> Result<AutoResolveStrategy, CliError> {
    let db = open_database(&context.db_path)?;
    let mut service = open_service(&db, &context.config);

    let current = match strategy {
        Some(raw) => {
            let raw = raw.trim();
            service
                .set_auto_resolve_strategy(raw)
                .ok_or_else(|| CliError::InvalidStrategy(raw.to_string()))?
        }
        None => service.get_auto_resolve_strategy(),
    };

    println!("{current}");
    Ok(current)
}
