//! Data models for Konflikt

mod conflict;
mod record;
mod settings;

pub use conflict::{ConflictId, ConflictRecord, ConflictStatus, FieldDiff, NewConflict, Resolution};
pub use record::{derive_record_title, record_id, record_timestamp, Record, UNKNOWN_RECORD_TITLE};
pub use settings::{AutoResolveStrategy, ConflictSettings};
