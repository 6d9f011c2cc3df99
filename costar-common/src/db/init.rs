//! Database initialization
//!
//! Opens (or creates) the SQLite database file, applies connection pragmas and
//! brings the schema up to date via [`run_migrations`](crate::db::migrations::run_migrations).

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL allows concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    crate::db::migrations::run_migrations(&pool).await?;

    Ok(pool)
}

/// Initialize an in-memory database with the current schema
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    crate::db::migrations::run_migrations(&pool).await?;

    Ok(pool)
}
