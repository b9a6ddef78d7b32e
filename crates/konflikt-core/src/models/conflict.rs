//! Conflict queue model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::Record;

/// A unique identifier for a queued conflict, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConflictId(Uuid);

impl ConflictId {
    /// Create a new unique conflict ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for ConflictId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConflictId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ConflictId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Lifecycle state of a queued conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictStatus {
    /// Waiting for an operator or automation
    Pending,
    /// Settled by one of the resolution strategies
    Resolved,
}

/// Strategy that settled a conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resolution {
    KeepLocal,
    KeepRemote,
    ManualMerge,
}

impl Resolution {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::KeepLocal => "keep-local",
            Self::KeepRemote => "keep-remote",
            Self::ManualMerge => "manual-merge",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One divergent field between the local and remote copy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDiff {
    pub field: String,
    #[serde(default)]
    pub local_value: Option<Value>,
    #[serde(default)]
    pub remote_value: Option<Value>,
    /// `updated_at`/`created_at` of the local record, context only
    #[serde(default)]
    pub local_timestamp: Option<Value>,
    /// `updated_at`/`created_at` of the remote record, context only
    #[serde(default)]
    pub remote_timestamp: Option<Value>,
}

/// Input for queueing a detected conflict
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewConflict {
    pub table: String,
    pub record_id: String,
    /// Overrides the derived title when set
    pub record_title: Option<String>,
    pub local_record: Record,
    pub remote_record: Record,
    pub conflicting_fields: Vec<FieldDiff>,
}

/// A detected divergence between a local and a remote copy of one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictRecord {
    pub id: ConflictId,
    /// Collection the record belongs to (e.g. `invoices`)
    pub table: String,
    pub record_id: String,
    /// Cosmetic label, never used for identity
    pub record_title: String,
    pub detected_at: DateTime<Utc>,
    pub local_record: Record,
    pub remote_record: Record,
    pub conflicting_fields: Vec<FieldDiff>,
    pub status: ConflictStatus,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resolution: Option<Resolution>,
}

impl ConflictRecord {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == ConflictStatus::Pending
    }

    /// Whether this conflict tracks the given record
    #[must_use]
    pub fn concerns(&self, table: &str, record_id: &str) -> bool {
        self.table == table && self.record_id == record_id
    }

    /// Settle the conflict. Status, timestamp and strategy change together.
    pub(crate) fn mark_resolved(&mut self, resolution: Resolution, at: DateTime<Utc>) {
        self.status = ConflictStatus::Resolved;
        self.resolved_at = Some(at);
        self.resolution = Some(resolution);
    }
}
