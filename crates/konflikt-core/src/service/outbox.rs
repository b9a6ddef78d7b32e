//! Outbound sync queue
//!
//! Every applied resolution is appended here so the sync layer can push it
//! to the remote side. The engine only ever appends; draining is up to the
//! caller.

use serde::{Deserialize, Serialize};

use super::ConflictService;
use crate::db::Storage;
use crate::error::Result;
use crate::models::Record;
use crate::util::unix_millis_now;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutboxAction {
    Upsert,
}

/// A record waiting to be pushed to the remote side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboxEntry {
    pub table: String,
    pub action: OutboxAction,
    pub data: Record,
    /// Unix milliseconds at enqueue time
    pub timestamp: i64,
}

impl<S: Storage> ConflictService<S> {
    /// Entries waiting to be pushed, oldest first.
    ///
    /// An unreadable outbox is logged and reads as empty.
    pub fn pending_outbox(&self) -> Vec<OutboxEntry> {
        self.load_outbox().unwrap_or_else(|error| {
            tracing::warn!("Failed to read sync outbox: {error}");
            Vec::new()
        })
    }

    /// Drop every queued entry. Returns how many were removed.
    pub fn clear_outbox(&mut self) -> Result<usize> {
        let count = self.pending_outbox().len();
        self.storage.remove(&self.config.outbox_key)?;
        tracing::info!("Cleared {count} sync outbox entries");
        Ok(count)
    }

    pub(super) fn enqueue_upsert(&mut self, table: &str, record: &Record) -> Result<()> {
        let mut entries = self.load_outbox()?;
        entries.push(OutboxEntry {
            table: table.to_string(),
            action: OutboxAction::Upsert,
            data: record.clone(),
            timestamp: unix_millis_now(),
        });
        let raw = serde_json::to_string(&entries)?;
        self.storage.set(&self.config.outbox_key, &raw)
    }

    fn load_outbox(&self) -> Result<Vec<OutboxEntry>> {
        match self.storage.get(&self.config.outbox_key)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }
}
