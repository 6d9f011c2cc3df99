//! Database initialization, schema migrations and the key-value store

pub mod init;
pub mod kv;
pub mod migrations;

pub use init::*;
pub use kv::*;
pub use migrations::*;
