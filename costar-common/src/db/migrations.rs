//! Database schema migrations
//!
//! Versioned migrations tracked in the `schema_version` table. Every migration is
//! idempotent, so running the full chain against an up-to-date database is a no-op.
//!
//! # Migration Guidelines
//!
//! 1. **Never modify existing migrations** - databases in the field were built by them
//! 2. **Always add new migrations** - one function per schema change
//! 3. **Check before altering** - inspect `sqlite_master` / `pragma_table_info` first

use crate::Result;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Current schema version
///
/// **IMPORTANT:** Increment this when adding new migrations
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Get current schema version from database
///
/// Returns 0 if schema_version table doesn't exist or has no rows
pub async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name='schema_version'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i32> =
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;

    Ok(version.unwrap_or(0))
}

async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;

    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER NOT NULL,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    if current_version < 1 {
        migrate_v1(pool).await?;
        set_schema_version(pool, 1).await?;
        info!("Migration v1 completed");
    }

    Ok(())
}

/// Migration v1: key-value table backing persisted selections
async fn migrate_v1(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
