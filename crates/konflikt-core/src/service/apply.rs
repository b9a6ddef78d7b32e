//! Writes resolved records back into the local collections

use chrono::Utc;
use serde_json::Value;

use super::ConflictService;
use crate::db::Storage;
use crate::error::{Error, Result};
use crate::models::Record;
use crate::util::iso_timestamp;

impl<S: Storage> ConflictService<S> {
    /// Records currently stored in the local collection for `table`.
    ///
    /// Missing or unreadable collections read as empty.
    pub fn collection(&self, table: &str) -> Vec<Record> {
        self.load_collection(table).unwrap_or_else(|error| {
            tracing::warn!("Failed to read collection `{table}`: {error}");
            Vec::new()
        })
    }

    /// Upsert `record` into its local collection and queue it for the remote.
    ///
    /// Failures are logged; the conflict stays resolved either way.
    pub(super) fn apply_resolution(&mut self, table: &str, record: &Record) {
        if let Err(error) = self.write_to_collection(table, record) {
            tracing::error!("Failed to apply resolution to `{table}`: {error}");
        }
        if let Err(error) = self.enqueue_upsert(table, record) {
            tracing::error!("Failed to queue `{table}` record for sync: {error}");
        }
    }

    fn write_to_collection(&mut self, table: &str, record: &Record) -> Result<()> {
        let mut items = self.load_collection(table)?;
        let stamp = Value::String(iso_timestamp(Utc::now()));

        let id = record.get("id").filter(|id| !id.is_null());
        let existing = id.and_then(|id| items.iter().position(|item| item.get("id") == Some(id)));

        if let Some(index) = existing {
            let item = &mut items[index];
            item.extend(record.clone());
            item.insert("updated_at".to_string(), stamp);
            tracing::debug!("Updated record in `{table}`");
        } else {
            let mut item = record.clone();
            item.insert("updated_at".to_string(), stamp);
            items.push(item);
            tracing::debug!("Inserted record into `{table}`");
        }

        let raw = serde_json::to_string(&items)?;
        self.storage.set(&self.config.collection_key(table), &raw)
    }

    fn load_collection(&self, table: &str) -> Result<Vec<Record>> {
        let key = self.config.collection_key(table);
        match self.storage.get(&key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|error| Error::Storage(format!("collection `{key}` is unreadable: {error}"))),
            None => Ok(Vec::new()),
        }
    }
}
