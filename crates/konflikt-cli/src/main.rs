//! Konflikt CLI - operator console for record sync conflicts
//!
//! Lists, inspects and resolves the conflicts queued in a local database.

mod cli;
mod commands;
mod error;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::cleanup::run_cleanup;
use crate::commands::common::{load_config, resolve_config_path, resolve_db_path, CliContext};
use crate::commands::completions::run_completions;
use crate::commands::history::run_history;
use crate::commands::ingest::run_ingest;
use crate::commands::list::run_list;
use crate::commands::merge::run_merge;
use crate::commands::outbox::run_outbox;
use crate::commands::resolve::{run_resolve, run_resolve_all};
use crate::commands::show::run_show;
use crate::commands::strategy::run_strategy;
use crate::error::CliError;

fn main() {
    if let Err(error) = run() {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "konflikt=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Commands::Completions { shell, output } = &cli.command {
        return run_completions(*shell, output.as_deref());
    }

    let context = CliContext {
        db_path: resolve_db_path(cli.db_path),
        config: load_config(&resolve_config_path(cli.config))?,
    };

    match cli.command {
        Commands::List { json } => run_list(json, &context)?,
        Commands::History { limit, json } => run_history(limit, json, &context)?,
        Commands::Show { id, json } => run_show(&id, json, &context)?,
        Commands::Resolve { id, side } => {
            run_resolve(&id, side, &context)?;
        }
        Commands::Merge {
            id,
            remote_fields,
            patch,
        } => {
            run_merge(&id, &remote_fields, patch.as_deref(), &context)?;
        }
        Commands::ResolveAll { side } => {
            run_resolve_all(side, &context)?;
        }
        Commands::Ingest { table, pairs } => {
            run_ingest(&table, &pairs, &context)?;
        }
        Commands::Strategy { strategy } => {
            run_strategy(strategy.as_deref(), &context)?;
        }
        Commands::Cleanup { older_than_days } => {
            run_cleanup(older_than_days, &context)?;
        }
        Commands::Outbox { json, clear } => run_outbox(json, clear, &context)?,
        Commands::Completions { .. } => {}
    }

    Ok(())
}
