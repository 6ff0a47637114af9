//! taxonomy-kit adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `store`: SQLite and in-memory record stores

mod store_memory;
mod store_sqlite;

/// Re-exports for record store adapters
pub mod store {
    pub use crate::store_memory::InMemoryRecordStore;
    pub use crate::store_sqlite::SqliteRecordStore;
}
