//! Commission schedule operations for the repository.

use crate::domain::{CommissionSchedule, Marketplace, NewCommissionSchedule, StoreId, TimeMs};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{bump_revision, decimal_column, Repository};

fn map_schedule_row(row: &SqliteRow) -> CommissionSchedule {
    CommissionSchedule {
        id: row.get("id"),
        store_id: StoreId::new(row.get("store_id")),
        marketplace: Marketplace::new(&row.get::<String, _>("marketplace")),
        product_id: row.get("product_id"),
        normal_rate: decimal_column(row, "normal_rate"),
        campaign_rate: decimal_column(row, "campaign_rate"),
        campaign_name: row.get("campaign_name"),
        valid_from: TimeMs::new(row.get("valid_from")),
        valid_until: TimeMs::new(row.get("valid_until")),
        seller_discount_share: decimal_column(row, "seller_discount_share"),
        marketplace_discount_share: decimal_column(row, "marketplace_discount_share"),
        is_active: row.get::<i64, _>("is_active") != 0,
    }
}

impl Repository {
    /// Insert a schedule and bump the scope's reference revision atomically.
    ///
    /// Returns the assigned row id.
    pub async fn insert_schedule(
        &self,
        schedule: &NewCommissionSchedule,
    ) -> Result<i64, sqlx::Error> {
        let mut tx = self.pool().begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO commission_schedules (
                store_id, marketplace, product_id, normal_rate, campaign_rate,
                campaign_name, valid_from, valid_until,
                seller_discount_share, marketplace_discount_share, is_active
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(schedule.store_id.as_str())
        .bind(schedule.marketplace.as_str())
        .bind(schedule.product_id)
        .bind(schedule.normal_rate.to_canonical_string())
        .bind(schedule.campaign_rate.to_canonical_string())
        .bind(&schedule.campaign_name)
        .bind(schedule.valid_from.as_ms())
        .bind(schedule.valid_until.as_ms())
        .bind(schedule.seller_discount_share.to_canonical_string())
        .bind(schedule.marketplace_discount_share.to_canonical_string())
        .bind(schedule.is_active as i64)
        .execute(&mut *tx)
        .await?;

        bump_revision(&mut tx, &schedule.store_id, &schedule.marketplace).await?;
        tx.commit().await?;

        Ok(result.last_insert_rowid())
    }

    /// Flip a schedule's kill-switch off. Terminal: the row survives for
    /// order history, but never competes again.
    ///
    /// Returns false when the row is missing or already deactivated.
    pub async fn deactivate_schedule(&self, id: i64) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool().begin().await?;

        let row = sqlx::query(
            "SELECT store_id, marketplace FROM commission_schedules WHERE id = ? AND is_active = 1",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let (store_id, marketplace) = match row {
            Some(row) => (
                StoreId::new(row.get("store_id")),
                Marketplace::new(&row.get::<String, _>("marketplace")),
            ),
            None => {
                tx.commit().await?;
                return Ok(false);
            }
        };

        sqlx::query("UPDATE commission_schedules SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        bump_revision(&mut tx, &store_id, &marketplace).await?;
        tx.commit().await?;

        Ok(true)
    }

    /// Fetch one schedule by id.
    pub async fn get_schedule(&self, id: i64) -> Result<Option<CommissionSchedule>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, store_id, marketplace, product_id, normal_rate,
                   campaign_rate, campaign_name, valid_from, valid_until,
                   seller_discount_share, marketplace_discount_share, is_active
            FROM commission_schedules WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.as_ref().map(map_schedule_row))
    }

    /// List every schedule in a store+marketplace scope, including expired
    /// and deactivated rows. Window state is recomputed by callers.
    pub async fn list_schedules(
        &self,
        store_id: &StoreId,
        marketplace: &Marketplace,
    ) -> Result<Vec<CommissionSchedule>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, store_id, marketplace, product_id, normal_rate,
                   campaign_rate, campaign_name, valid_from, valid_until,
                   seller_discount_share, marketplace_discount_share, is_active
            FROM commission_schedules
            WHERE store_id = ? AND marketplace = ?
            ORDER BY valid_from ASC, id ASC
            "#,
        )
        .bind(store_id.as_str())
        .bind(marketplace.as_str())
        .fetch_all(self.pool())
        .await?;

        Ok(rows.iter().map(map_schedule_row).collect())
    }
}
