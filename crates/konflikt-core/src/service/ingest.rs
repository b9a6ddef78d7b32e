//! Sync-pass ingestion
//!
//! The sync layer hands over local/remote snapshot pairs; each pair is
//! compared, queued when it diverges, and settled right away when an
//! automatic strategy is configured.

use serde::{Deserialize, Serialize};

use super::ConflictService;
use crate::db::Storage;
use crate::error::{Error, Result};
use crate::models::{record_id, AutoResolveStrategy, ConflictId, NewConflict, Record, Resolution};

/// Local and remote snapshot of one record, either side possibly missing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordPair {
    pub local: Option<Record>,
    pub remote: Option<Record>,
}

/// Supplies record pairs for a table
pub trait RecordPairSource {
    fn record_pairs(&mut self, table: &str) -> Result<Vec<RecordPair>>;
}

impl RecordPairSource for Vec<RecordPair> {
    fn record_pairs(&mut self, _table: &str) -> Result<Vec<RecordPair>> {
        Ok(std::mem::take(self))
    }
}

/// What happened to one ingested pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Both sides agree (or one is missing)
    InSync,
    /// Queued for manual resolution
    Queued(ConflictId),
    /// Queued and settled by the configured strategy
    AutoResolved {
        conflict_id: ConflictId,
        resolution: Resolution,
    },
}

/// Counts for one [`ConflictService::run_sync_pass`] run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPassSummary {
    pub scanned: usize,
    pub in_sync: usize,
    pub queued: usize,
    pub auto_resolved: usize,
    pub rejected: usize,
}

impl<S: Storage> ConflictService<S> {
    /// Compare one pair and queue or auto-resolve it.
    pub fn ingest(
        &mut self,
        table: &str,
        local: Option<Record>,
        remote: Option<Record>,
    ) -> Result<IngestOutcome> {
        let report = self.detect_conflict(table, local.as_ref(), remote.as_ref());
        if !report.has_conflict {
            return Ok(IngestOutcome::InSync);
        }

        let local = local.unwrap_or_default();
        let remote = remote.unwrap_or_default();
        let Some(id) = record_id(&local).or_else(|| record_id(&remote)) else {
            return Err(Error::InvalidInput(format!(
                "diverging `{table}` record has no id"
            )));
        };

        let conflict = self.add_conflict(NewConflict {
            table: table.to_string(),
            record_id: id,
            record_title: None,
            local_record: local,
            remote_record: remote,
            conflicting_fields: report.fields,
        })?;

        let resolution = match self.get_auto_resolve_strategy() {
            AutoResolveStrategy::Manual => return Ok(IngestOutcome::Queued(conflict.id)),
            AutoResolveStrategy::LocalWins => {
                self.resolve_keep_local(&conflict.id)?;
                Resolution::KeepLocal
            }
            AutoResolveStrategy::RemoteWins => {
                self.resolve_keep_remote(&conflict.id)?;
                Resolution::KeepRemote
            }
        };
        Ok(IngestOutcome::AutoResolved {
            conflict_id: conflict.id,
            resolution,
        })
    }

    /// Ingest every pair `source` yields for `table`.
    ///
    /// Pairs that cannot be queued are counted as rejected; only a failing
    /// source aborts the pass.
    pub fn run_sync_pass(
        &mut self,
        source: &mut impl RecordPairSource,
        table: &str,
    ) -> Result<SyncPassSummary> {
        let pairs = source.record_pairs(table)?;
        let mut summary = SyncPassSummary {
            scanned: pairs.len(),
            ..SyncPassSummary::default()
        };

        for pair in pairs {
            match self.ingest(table, pair.local, pair.remote) {
                Ok(IngestOutcome::InSync) => summary.in_sync += 1,
                Ok(IngestOutcome::Queued(_)) => summary.queued += 1,
                Ok(IngestOutcome::AutoResolved { .. }) => summary.auto_resolved += 1,
                Err(error) => {
                    tracing::warn!("Skipped `{table}` record pair: {error}");
                    summary.rejected += 1;
                }
            }
        }

        tracing::info!(
            "Sync pass over `{table}`: {} scanned, {} queued, {} auto-resolved",
            summary.scanned,
            summary.queued,
            summary.auto_resolved
        );
        Ok(summary)
    }
}
