use std::path::{Path, PathBuf};

use konflikt_core::service::{RecordPair, RecordPairSource, SyncPassSummary};

use crate::commands::common::{open_database, open_service, CliContext};
use crate::error::CliError;

/// Record pairs read from a JSON export of both sides
#[derive(Debug, Clone)]
pub struct PairsFile {
    path: PathBuf,
}

impl PairsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordPairSource for PairsFile {
    fn record_pairs(&mut self, table: &str) -> konflikt_core::Result<Vec<RecordPair>> {
        let raw = std::fs::read_to_string(&self.path)?;
        let pairs: Vec<RecordPair> = serde_json::from_str(&raw)?;
        tracing::debug!(
            "Read {} `{table}` pairs from {}",
            pairs.len(),
            self.path.display()
        );
        Ok(pairs)
    }
}

pub fn run_ingest(
    table: &str,
    pairs_path: &Path,
    context: &CliContext,
) -> Result<SyncPassSummary, CliError> {
    let db = open_database(&context.db_path)?;
    let mut service = open_service(&db, &context.config);
    let mut source = PairsFile::new(pairs_path);

    let summary = service.run_sync_pass(&mut source, table.trim())?;

    println!(
        "{} scanned, {} in sync, {} queued, {} auto-resolved, {} rejected",
        summary.scanned, summary.in_sync, summary.queued, summary.auto_resolved, summary.rejected
    );
    Ok(summary)
}
