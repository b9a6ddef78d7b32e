//! Resolution strategies

use std::collections::HashMap;

use chrono::Utc;
use serde_json::Value;

use super::{build_merge, ConflictService, FieldChoice};
use crate::db::Storage;
use crate::error::{Error, Result};
use crate::events::ConflictEvent;
use crate::models::{record_id, ConflictId, ConflictRecord, Record, Resolution};

impl<S: Storage> ConflictService<S> {
    /// Settle a pending conflict with a copy of the local snapshot.
    pub fn resolve_keep_local(&mut self, id: &ConflictId) -> Result<Record> {
        self.resolve_with(id, Resolution::KeepLocal, take_local)
    }

    /// Settle a pending conflict with a copy of the remote snapshot.
    pub fn resolve_keep_remote(&mut self, id: &ConflictId) -> Result<Record> {
        self.resolve_with(id, Resolution::KeepRemote, take_remote)
    }

    /// Settle a pending conflict with `merged` laid over the local snapshot.
    ///
    /// The result always carries the conflict's own record id, whatever
    /// `merged` says.
    pub fn resolve_manual_merge(&mut self, id: &ConflictId, merged: Record) -> Result<Record> {
        self.resolve_with(id, Resolution::ManualMerge, move |conflict| {
            merge_over_local(conflict, merged)
        })
    }

    /// Manual merge driven by per-field choices; see [`build_merge`].
    pub fn resolve_with_selections(
        &mut self,
        id: &ConflictId,
        choices: &HashMap<String, FieldChoice>,
    ) -> Result<Record> {
        self.resolve_with(id, Resolution::ManualMerge, |conflict| {
            merge_over_local(conflict, build_merge(conflict, choices))
        })
    }

    /// Keep the local copy for every conflict pending at call time.
    ///
    /// Returns the number of conflicts settled.
    pub fn resolve_all_keep_local(&mut self) -> usize {
        self.resolve_all(Resolution::KeepLocal, take_local)
    }

    /// Keep the remote copy for every conflict pending at call time.
    ///
    /// Returns the number of conflicts settled.
    pub fn resolve_all_keep_remote(&mut self) -> usize {
        self.resolve_all(Resolution::KeepRemote, take_remote)
    }

    fn resolve_all(&mut self, resolution: Resolution, pick: fn(&ConflictRecord) -> Record) -> usize {
        // Snapshot: conflicts queued while the batch runs wait for the next one.
        let pending = self
            .get_pending_conflicts()
            .iter()
            .map(|conflict| conflict.id)
            .collect::<Vec<_>>();

        let resolved = pending
            .iter()
            .filter(|id| self.resolve_with(id, resolution, pick).is_ok())
            .count();

        tracing::info!(
            "Batch resolved {resolved} of {} conflicts with {resolution}",
            pending.len()
        );
        self.events.emit(&ConflictEvent::ConflictsBatchResolved {
            count: resolved,
            strategy: resolution,
        });
        resolved
    }

    fn resolve_with(
        &mut self,
        id: &ConflictId,
        resolution: Resolution,
        build: impl FnOnce(&ConflictRecord) -> Record,
    ) -> Result<Record> {
        let Some(conflict) = self.conflicts.iter_mut().find(|conflict| conflict.id == *id) else {
            tracing::warn!("Conflict not found: {id}");
            return Err(Error::NotFound(id.to_string()));
        };
        if !conflict.is_pending() {
            tracing::warn!("Conflict {id} is already resolved");
            return Err(Error::AlreadyResolved(id.to_string()));
        }

        let resolved_record = build(conflict);
        conflict.mark_resolved(resolution, Utc::now());
        let conflict = conflict.clone();

        self.persist_conflicts();
        self.apply_resolution(&conflict.table, &resolved_record);
        tracing::info!(
            "Resolved conflict {id} ({}/{}) with {resolution}",
            conflict.table,
            conflict.record_id
        );
        self.events.emit(&ConflictEvent::ConflictResolved {
            conflict,
            resolved_record: resolved_record.clone(),
        });
        Ok(resolved_record)
    }
}

fn take_local(conflict: &ConflictRecord) -> Record {
    conflict.local_record.clone()
}

fn take_remote(conflict: &ConflictRecord) -> Record {
    conflict.remote_record.clone()
}

fn merge_over_local(conflict: &ConflictRecord, merged: Record) -> Record {
    let mut record = conflict.local_record.clone();
    record.extend(merged);
    record.insert("id".to_string(), pinned_id(conflict));
    record
}

/// The conflict's record id, keeping the local snapshot's JSON type when it
/// carries the same id (so numeric ids stay numeric).
fn pinned_id(conflict: &ConflictRecord) -> Value {
    match conflict.local_record.get("id") {
        Some(id) if record_id(&conflict.local_record).as_deref() == Some(&conflict.record_id) => {
            id.clone()
        }
        _ => Value::String(conflict.record_id.clone()),
    }
}
