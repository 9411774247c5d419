//! Subscriber persistence on SQLite

pub mod db;
pub mod subscribers;

// Re-exports for convenience
pub use db::{create_pool, get_connection, DbConnection, DbPool};
pub use subscribers::{Frequency, Subscriber, SubscriberPatch};
