//! Repository layer for database operations.
//!
//! This module provides the `Repository` struct for all database operations.
//! Methods are organized across submodules by domain:
//! - `products.rs` - Product CRUD
//! - `shipping.rs` - Shipping rate tier operations and default seeding
//! - `schedules.rs` - Commission schedule operations
//! - `orders.rs` - Order line recording and queries

mod orders;
mod products;
mod schedules;
mod shipping;

use crate::domain::{Decimal, Marketplace, StoreId};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use tracing::warn;

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // =========================================================================
    // Reference revision operations
    // =========================================================================

    /// Current reference-data revision for a store+marketplace scope.
    ///
    /// Zero when no reference write has happened yet.
    pub async fn get_revision(
        &self,
        store_id: &StoreId,
        marketplace: &Marketplace,
    ) -> Result<i64, sqlx::Error> {
        let row = sqlx::query(
            "SELECT revision FROM reference_revisions WHERE store_id = ? AND marketplace = ?",
        )
        .bind(store_id.as_str())
        .bind(marketplace.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.get("revision")).unwrap_or(0))
    }
}

/// Bump the reference revision for a scope inside the caller's transaction.
///
/// Every write to products, tiers or schedules must call this on the same
/// connection before committing, so a derived view can never observe the new
/// data under the old revision.
pub(crate) async fn bump_revision(
    conn: &mut sqlx::SqliteConnection,
    store_id: &StoreId,
    marketplace: &Marketplace,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO reference_revisions (store_id, marketplace, revision, updated_ms)
        VALUES (?, ?, 1, ?)
        ON CONFLICT(store_id, marketplace) DO UPDATE SET
            revision = revision + 1,
            updated_ms = excluded.updated_ms
        "#,
    )
    .bind(store_id.as_str())
    .bind(marketplace.as_str())
    .bind(chrono::Utc::now().timestamp_millis())
    .execute(conn)
    .await?;

    Ok(())
}

/// Read a decimal column stored as a canonical string, falling back to zero
/// on corruption rather than failing the whole query.
pub(crate) fn decimal_column(row: &SqliteRow, column: &str) -> Decimal {
    let raw: String = row.get(column);
    Decimal::from_str(&raw).unwrap_or_else(|e| {
        warn!(
            column = column,
            value = %raw,
            error = %e,
            "Failed to parse stored decimal, using default"
        );
        Decimal::default()
    })
}
