//! Conflict queue service
//!
//! [`ConflictService`] owns the in-memory conflict queue and mirrors it to
//! [`Storage`] after every mutation. It is constructed once at startup with
//! its storage and configuration injected; observers register on its event
//! bus.
//!
//! Storage write failures are logged and otherwise ignored: the in-memory
//! change stands even when it could not be made durable.

mod apply;
mod ingest;
mod merge;
mod outbox;
mod resolve;
#[cfg(test)]
mod tests;

pub use ingest::{IngestOutcome, RecordPair, RecordPairSource, SyncPassSummary};
pub use merge::{build_merge, FieldChoice};
pub use outbox::{OutboxAction, OutboxEntry};

use chrono::{DateTime, Duration, Utc};

use crate::config::EngineConfig;
use crate::db::Storage;
use crate::detect::{self, ConflictReport};
use crate::error::{Error, Result};
use crate::events::{ConflictEvent, EventBus, SubscriptionId};
use crate::models::{
    derive_record_title, AutoResolveStrategy, ConflictId, ConflictRecord, ConflictSettings,
    ConflictStatus, NewConflict, Record,
};
use crate::util::normalize_text_option;

/// Detects, queues and settles conflicts between local and remote records.
pub struct ConflictService<S: Storage> {
    storage: S,
    config: EngineConfig,
    conflicts: Vec<ConflictRecord>,
    events: EventBus,
}

impl<S: Storage> ConflictService<S> {
    /// Create a service with the default storage layout.
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, EngineConfig::default())
    }

    /// Create a service and load any previously persisted queue.
    ///
    /// An unreadable queue is logged and replaced by an empty one.
    pub fn with_config(storage: S, config: EngineConfig) -> Self {
        let conflicts = load_conflicts(&storage, &config.queue_key);
        tracing::debug!(
            "Loaded {} conflicts from `{}`",
            conflicts.len(),
            config.queue_key
        );
        Self {
            storage,
            config,
            conflicts,
            events: EventBus::new(),
        }
    }

    /// Register an event listener.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&ConflictEvent) + 'static,
    ) -> SubscriptionId {
        self.events.subscribe(listener)
    }

    /// Remove an event listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub const fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Compare two snapshots without touching the queue.
    pub fn detect_conflict(
        &self,
        table: &str,
        local: Option<&Record>,
        remote: Option<&Record>,
    ) -> ConflictReport {
        detect::detect_conflict(table, local, remote)
    }

    /// Queue a detected conflict.
    ///
    /// A pending conflict for the same `(table, record_id)` is refreshed in
    /// place (detection time, both snapshots and the field list) instead of
    /// being duplicated. Resolved conflicts are never reopened. Returns the
    /// stored entry.
    pub fn add_conflict(&mut self, data: NewConflict) -> Result<ConflictRecord> {
        let table = data.table.trim();
        if table.is_empty() {
            tracing::warn!("Rejected conflict without table name");
            return Err(Error::InvalidInput("table must not be empty".to_string()));
        }
        let record_id = data.record_id.trim();
        if record_id.is_empty() {
            tracing::warn!("Rejected conflict for `{table}` without record id");
            return Err(Error::InvalidInput("record id must not be empty".to_string()));
        }

        let now = Utc::now();
        let existing = self
            .conflicts
            .iter()
            .position(|conflict| conflict.is_pending() && conflict.concerns(table, record_id));

        let stored = if let Some(index) = existing {
            let conflict = &mut self.conflicts[index];
            conflict.detected_at = now;
            conflict.local_record = data.local_record;
            conflict.remote_record = data.remote_record;
            conflict.conflicting_fields = data.conflicting_fields;
            tracing::debug!("Refreshed pending conflict {} for {table}/{record_id}", conflict.id);
            conflict.clone()
        } else {
            let record_title = normalize_text_option(data.record_title).unwrap_or_else(|| {
                derive_record_title(
                    Some(&data.local_record).filter(|record| !record.is_empty()),
                    Some(&data.remote_record).filter(|record| !record.is_empty()),
                )
            });
            let conflict = ConflictRecord {
                id: ConflictId::new(),
                table: table.to_string(),
                record_id: record_id.to_string(),
                record_title,
                detected_at: now,
                local_record: data.local_record,
                remote_record: data.remote_record,
                conflicting_fields: data.conflicting_fields,
                status: ConflictStatus::Pending,
                resolved_at: None,
                resolution: None,
            };
            tracing::info!("Queued conflict {} for {table}/{record_id}", conflict.id);
            self.conflicts.push(conflict.clone());
            conflict
        };

        self.persist_conflicts();
        self.events.emit(&ConflictEvent::ConflictAdded {
            conflict: stored.clone(),
        });
        Ok(stored)
    }

    /// Every queued entry, pending and resolved, in queue order.
    pub fn conflicts(&self) -> &[ConflictRecord] {
        &self.conflicts
    }

    /// Pending conflicts in queue order.
    pub fn get_pending_conflicts(&self) -> Vec<&ConflictRecord> {
        self.conflicts
            .iter()
            .filter(|conflict| conflict.is_pending())
            .collect()
    }

    /// Resolved conflicts, most recently resolved first.
    pub fn get_conflict_history(&self) -> Vec<&ConflictRecord> {
        let mut history = self
            .conflicts
            .iter()
            .filter(|conflict| !conflict.is_pending())
            .collect::<Vec<_>>();
        history.sort_by(|a, b| b.resolved_at.cmp(&a.resolved_at));
        history
    }

    /// Number of pending conflicts.
    pub fn get_conflict_count(&self) -> usize {
        self.conflicts
            .iter()
            .filter(|conflict| conflict.is_pending())
            .count()
    }

    pub fn get_conflict(&self, id: &ConflictId) -> Option<&ConflictRecord> {
        self.conflicts.iter().find(|conflict| conflict.id == *id)
    }

    /// Change the auto-resolve strategy.
    ///
    /// Only `manual`, `local-wins` and `remote-wins` are accepted; anything
    /// else leaves the settings untouched, emits nothing and returns `None`.
    pub fn set_auto_resolve_strategy(&mut self, raw: &str) -> Option<AutoResolveStrategy> {
        let Some(strategy) = AutoResolveStrategy::parse(raw) else {
            tracing::warn!("Ignoring invalid auto-resolve strategy `{raw}`");
            return None;
        };

        let mut settings = self.load_settings();
        settings.auto_resolve_strategy = Some(strategy);
        match serde_json::to_string(&settings) {
            Ok(payload) => {
                if let Err(error) = self.storage.set(&self.config.settings_key, &payload) {
                    tracing::error!("Failed to persist conflict settings: {error}");
                }
            }
            Err(error) => tracing::error!("Failed to serialize conflict settings: {error}"),
        }

        tracing::info!("Auto-resolve strategy set to {strategy}");
        self.events
            .emit(&ConflictEvent::ConflictSettingsChanged { strategy });
        Some(strategy)
    }

    /// Current auto-resolve strategy; `manual` when unset or unreadable.
    pub fn get_auto_resolve_strategy(&self) -> AutoResolveStrategy {
        self.load_settings().strategy()
    }

    /// Purge resolved conflicts resolved more than `older_than_days` ago.
    ///
    /// Pending conflicts are never purged. Returns the number removed; a
    /// threshold reaching past the earliest representable time removes nothing.
    pub fn clear_resolved_conflicts(&mut self, older_than_days: u32) -> usize {
        let cutoff = Duration::try_days(i64::from(older_than_days))
            .and_then(|age| Utc::now().checked_sub_signed(age));
        let Some(cutoff) = cutoff else {
            tracing::debug!("Retention of {older_than_days} days predates every resolution");
            return 0;
        };
        self.clear_resolved_before(cutoff)
    }

    /// Purge using the configured retention window.
    pub fn clear_expired_conflicts(&mut self) -> usize {
        self.clear_resolved_conflicts(self.config.retention_days)
    }

    /// Purge resolved conflicts whose resolution is not newer than `cutoff`.
    pub fn clear_resolved_before(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.conflicts.len();
        self.conflicts.retain(|conflict| {
            conflict.is_pending() || conflict.resolved_at.is_some_and(|at| at > cutoff)
        });

        let removed = before - self.conflicts.len();
        if removed > 0 {
            self.persist_conflicts();
            tracing::info!("Cleared {removed} old resolved conflicts");
        }
        removed
    }

    fn load_settings(&self) -> ConflictSettings {
        match self.storage.get(&self.config.settings_key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|error| {
                tracing::warn!("Unreadable conflict settings, using defaults: {error}");
                ConflictSettings::default()
            }),
            Ok(None) => ConflictSettings::default(),
            Err(error) => {
                tracing::warn!("Failed to read conflict settings: {error}");
                ConflictSettings::default()
            }
        }
    }

    fn persist_conflicts(&mut self) {
        let raw = match serde_json::to_string(&self.conflicts) {
            Ok(raw) => raw,
            Err(error) => {
                tracing::error!("Failed to serialize conflict queue: {error}");
                return;
            }
        };
        if let Err(error) = self.storage.set(&self.config.queue_key, &raw) {
            tracing::error!("Failed to persist conflict queue: {error}");
        }
    }
}

fn load_conflicts(storage: &impl Storage, key: &str) -> Vec<ConflictRecord> {
    match storage.get(key) {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|error| {
            tracing::error!("Unreadable conflict queue at `{key}`: {error}");
            Vec::new()
        }),
        Ok(None) => Vec::new(),
        Err(error) => {
            tracing::error!("Failed to load conflict queue: {error}");
            Vec::new()
        }
    }
}
