//! # Costar Common Library
//!
//! Shared code for the Costar workspace including:
//! - Error types
//! - Bootstrap configuration and root folder resolution
//! - SQLite initialization, schema migrations and the key-value store
//! - Event types (CostarEvent) and the EventBus

pub mod config;
pub mod db;
pub mod error;
pub mod events;

pub use db::kv::{KeyValueStore, MemoryKvStore, SqliteKvStore};
pub use error::{Error, Result};
pub use events::{CostarEvent, EventBus};
