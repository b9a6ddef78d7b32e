pub mod cleanup;
pub mod common;
pub mod completions;
pub mod history;
pub mod ingest;
pub mod list;
pub mod merge;
pub mod outbox;
pub mod resolve;
pub mod show;
pub mod strategy;
