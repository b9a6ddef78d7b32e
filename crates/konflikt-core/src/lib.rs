//! konflikt-core - Conflict detection and resolution for record sync
//!
//! This crate compares local and remote copies of business records, keeps a
//! durable queue of the conflicts it finds, and settles them by keeping one
//! side or merging both. Resolved records are written back to the local
//! collections and queued for upload.

pub mod config;
pub mod db;
pub mod detect;
pub mod error;
pub mod events;
pub mod models;
pub mod service;
pub mod util;

pub use config::EngineConfig;
pub use detect::{detect_conflict, ConflictReport};
pub use error::{Error, Result};
pub use events::{ConflictEvent, SubscriptionId};
pub use models::{
    AutoResolveStrategy, ConflictId, ConflictRecord, ConflictStatus, FieldDiff, NewConflict,
    Record, Resolution,
};
pub use service::ConflictService;
