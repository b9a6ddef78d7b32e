use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "konflikt")]
#[command(about = "Review and resolve record sync conflicts from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Optional path to engine config file (JSON)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List pending conflicts
    #[command(alias = "ls")]
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List resolved conflicts, most recent first
    History {
        /// Number of conflicts to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a conflict field by field
    Show {
        /// Conflict ID or unique ID prefix
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resolve a conflict by keeping one side
    Resolve {
        /// Conflict ID or unique ID prefix
        id: String,
        /// Side to keep
        #[arg(value_enum)]
        side: Side,
    },
    /// Resolve a conflict by merging both sides
    Merge {
        /// Conflict ID or unique ID prefix
        id: String,
        /// Take this field from the remote copy (repeatable)
        #[arg(long = "remote", value_name = "FIELD")]
        remote_fields: Vec<String>,
        /// JSON object with explicit field values
        #[arg(long, value_name = "FILE")]
        patch: Option<PathBuf>,
    },
    /// Resolve every pending conflict by keeping one side
    ResolveAll {
        /// Side to keep
        #[arg(value_enum)]
        side: Side,
    },
    /// Compare local/remote record pairs from a JSON file and queue conflicts
    Ingest {
        /// Collection the records belong to
        table: String,
        /// JSON array of `{"local": {...}, "remote": {...}}` objects
        #[arg(value_name = "FILE")]
        pairs: PathBuf,
    },
    /// Show or set the auto-resolve strategy
    Strategy {
        /// manual, local-wins or remote-wins
        strategy: Option<String>,
    },
    /// Remove old resolved conflicts
    Cleanup {
        /// Age threshold in days (defaults to the configured retention)
        #[arg(long, value_name = "DAYS")]
        older_than_days: Option<u32>,
    },
    /// Show records queued for upload
    Outbox {
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Drop every queued record
        #[arg(long)]
        clear: bool,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum Side {
    Local,
    Remote,
}
