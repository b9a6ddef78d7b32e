//! Storage layer for Konflikt

mod connection;
mod memory;
mod migrations;
mod store;

pub use connection::Database;
pub use memory::MemoryStorage;
pub use store::{SqliteStorage, Storage};
