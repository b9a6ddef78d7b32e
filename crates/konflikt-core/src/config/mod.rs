//! Engine configuration.
//!
//! Storage key names and the retention window. Values come from built-in
//! defaults, an optional JSON file, and `KONFLIKT_*` environment overrides,
//! in that order.

use std::collections::HashMap;
use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::normalize_text_option;

const DEFAULT_QUEUE_KEY: &str = "freyai_sync_conflicts";
const DEFAULT_SETTINGS_KEY: &str = "freyai_conflict_settings";
const DEFAULT_COLLECTION_PREFIX: &str = "hwf_";
const DEFAULT_OUTBOX_KEY: &str = "hwf_sync_queue";
const DEFAULT_RETENTION_DAYS: u32 = 30;

/// Storage layout and retention settings for a conflict service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct EngineConfig {
    /// Storage key holding the conflict queue
    pub queue_key: String,
    /// Storage key holding the settings record
    pub settings_key: String,
    /// Prefix for per-table collections (`hwf_invoices`)
    pub collection_prefix: String,
    /// Storage key holding records waiting to be pushed to the remote
    pub outbox_key: String,
    /// Default age, in days, after which resolved conflicts are purged
    pub retention_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            queue_key: DEFAULT_QUEUE_KEY.to_string(),
            settings_key: DEFAULT_SETTINGS_KEY.to_string(),
            collection_prefix: DEFAULT_COLLECTION_PREFIX.to_string(),
            outbox_key: DEFAULT_OUTBOX_KEY.to_string(),
            retention_days: DEFAULT_RETENTION_DAYS,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config document; omitted fields keep their defaults.
    pub fn from_json(payload: &str) -> Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Load a JSON config file, falling back to defaults when it is missing.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Defaults with `KONFLIKT_*` environment overrides applied.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    /// Apply `KONFLIKT_*` environment overrides on top of `self`.
    pub fn with_env_overrides(self) -> Result<Self> {
        let values: HashMap<String, String> = env::vars().collect();
        self.with_overrides(|name| values.get(name).cloned())
    }

    /// Apply overrides from an arbitrary lookup; blank values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let read = |name: &str| normalize_text_option(lookup(name));

        if let Some(value) = read("KONFLIKT_QUEUE_KEY") {
            self.queue_key = value;
        }
        if let Some(value) = read("KONFLIKT_SETTINGS_KEY") {
            self.settings_key = value;
        }
        if let Some(value) = read("KONFLIKT_COLLECTION_PREFIX") {
            self.collection_prefix = value;
        }
        if let Some(value) = read("KONFLIKT_OUTBOX_KEY") {
            self.outbox_key = value;
        }
        if let Some(value) = read("KONFLIKT_RETENTION_DAYS") {
            self.retention_days = value.parse().map_err(|_| {
                Error::InvalidInput(format!(
                    "KONFLIKT_RETENTION_DAYS must be a non-negative integer, got `{value}`"
                ))
            })?;
        }

        Ok(self)
    }

    /// Storage key of the local collection for `table`.
    pub fn collection_key(&self, table: &str) -> String {
        format!("{}{table}", self.collection_prefix)
    }
}
