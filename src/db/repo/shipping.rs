//! Shipping rate tier operations for the repository.

use crate::domain::{Marketplace, NewShippingRateTier, RateType, ShippingRateTier, StoreId};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::warn;

use super::{bump_revision, decimal_column, Repository};

fn map_tier_row(row: &SqliteRow) -> Option<ShippingRateTier> {
    let rate_type_raw: String = row.get("rate_type");
    let rate_type = match RateType::parse(&rate_type_raw) {
        Some(rt) => rt,
        None => {
            warn!(
                id = row.get::<i64, _>("id"),
                rate_type = %rate_type_raw,
                "Skipping shipping tier with unknown rate_type"
            );
            return None;
        }
    };

    Some(ShippingRateTier {
        id: row.get("id"),
        store_id: row
            .get::<Option<String>, _>("store_id")
            .map(StoreId::new),
        marketplace: Marketplace::new(&row.get::<String, _>("marketplace")),
        rate_type,
        min_value: decimal_column(row, "min_value"),
        max_value: decimal_column(row, "max_value"),
        cost: decimal_column(row, "cost"),
        vat_included: row.get::<i64, _>("vat_included") != 0,
        is_active: row.get::<i64, _>("is_active") != 0,
    })
}

impl Repository {
    /// Insert a tier row. Custom rows bump their scope's revision; default
    /// rows (no store) do not, since first-read computation picks them up.
    ///
    /// Returns the assigned row id.
    pub async fn insert_tier(&self, tier: &NewShippingRateTier) -> Result<i64, sqlx::Error> {
        let mut tx = self.pool().begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO shipping_rate_tiers (
                store_id, marketplace, rate_type, min_value, max_value,
                cost, vat_included, is_active
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(tier.store_id.as_ref().map(|s| s.as_str()))
        .bind(tier.marketplace.as_str())
        .bind(tier.rate_type.as_str())
        .bind(tier.min_value.to_canonical_string())
        .bind(tier.max_value.to_canonical_string())
        .bind(tier.cost.to_canonical_string())
        .bind(tier.vat_included as i64)
        .bind(tier.is_active as i64)
        .execute(&mut *tx)
        .await?;

        if let Some(store_id) = &tier.store_id {
            bump_revision(&mut tx, store_id, &tier.marketplace).await?;
        }
        tx.commit().await?;

        Ok(result.last_insert_rowid())
    }

    /// Replace a custom tier's fields. Default rows are not editable.
    ///
    /// Returns false when no custom row with this id exists. The revision
    /// bump targets the row's own scope, not whatever the caller claims.
    pub async fn update_tier(
        &self,
        id: i64,
        tier: &NewShippingRateTier,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool().begin().await?;

        let row = sqlx::query(
            "SELECT store_id, marketplace FROM shipping_rate_tiers WHERE id = ? AND store_id IS NOT NULL",
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

        sqlx::query(
            r#"
            UPDATE shipping_rate_tiers SET
                rate_type = ?, min_value = ?, max_value = ?,
                cost = ?, vat_included = ?, is_active = ?
            WHERE id = ?
            "#,
        )
        .bind(tier.rate_type.as_str())
        .bind(tier.min_value.to_canonical_string())
        .bind(tier.max_value.to_canonical_string())
        .bind(tier.cost.to_canonical_string())
        .bind(tier.vat_included as i64)
        .bind(tier.is_active as i64)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        bump_revision(&mut tx, &store_id, &marketplace).await?;
        tx.commit().await?;

        Ok(true)
    }

    /// Delete a custom tier row. Default rows are not deletable by id.
    ///
    /// Returns false when no custom row with this id exists.
    pub async fn delete_tier(&self, id: i64) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool().begin().await?;

        let row = sqlx::query(
            "SELECT store_id, marketplace FROM shipping_rate_tiers WHERE id = ? AND store_id IS NOT NULL",
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

        sqlx::query("DELETE FROM shipping_rate_tiers WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        bump_revision(&mut tx, &store_id, &marketplace).await?;
        tx.commit().await?;

        Ok(true)
    }

    /// Reset to marketplace defaults by deleting the store's custom rows.
    ///
    /// Scoped to one rate type when given, otherwise both axes. Returns the
    /// number of deleted rows.
    pub async fn reset_tiers(
        &self,
        store_id: &StoreId,
        marketplace: &Marketplace,
        rate_type: Option<RateType>,
    ) -> Result<u64, sqlx::Error> {
        let mut tx = self.pool().begin().await?;

        let result = match rate_type {
            Some(rt) => {
                sqlx::query(
                    r#"
                    DELETE FROM shipping_rate_tiers
                    WHERE store_id = ? AND marketplace = ? AND rate_type = ?
                    "#,
                )
                .bind(store_id.as_str())
                .bind(marketplace.as_str())
                .bind(rt.as_str())
                .execute(&mut *tx)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    DELETE FROM shipping_rate_tiers
                    WHERE store_id = ? AND marketplace = ?
                    "#,
                )
                .bind(store_id.as_str())
                .bind(marketplace.as_str())
                .execute(&mut *tx)
                .await?
            }
        };

        bump_revision(&mut tx, store_id, marketplace).await?;
        tx.commit().await?;

        Ok(result.rows_affected())
    }

    /// All tier rows visible to a store on a marketplace: the store's own
    /// customs plus the marketplace defaults. Custom-over-default shadowing
    /// happens in memory when the lookup table is built.
    pub async fn list_visible_tiers(
        &self,
        store_id: &StoreId,
        marketplace: &Marketplace,
    ) -> Result<Vec<ShippingRateTier>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, store_id, marketplace, rate_type, min_value, max_value,
                   cost, vat_included, is_active
            FROM shipping_rate_tiers
            WHERE marketplace = ? AND (store_id IS NULL OR store_id = ?)
            ORDER BY id ASC
            "#,
        )
        .bind(marketplace.as_str())
        .bind(store_id.as_str())
        .fetch_all(self.pool())
        .await?;

        Ok(rows.iter().filter_map(map_tier_row).collect())
    }

    /// Insert a marketplace's default card in one transaction, unless default
    /// rows already exist for it. Returns the number of inserted rows.
    pub async fn seed_default_tiers(
        &self,
        marketplace: &Marketplace,
        tiers: &[NewShippingRateTier],
    ) -> Result<usize, sqlx::Error> {
        let mut tx = self.pool().begin().await?;

        let row = sqlx::query(
            "SELECT COUNT(*) as n FROM shipping_rate_tiers WHERE marketplace = ? AND store_id IS NULL",
        )
        .bind(marketplace.as_str())
        .fetch_one(&mut *tx)
        .await?;
        let existing: i64 = row.get("n");
        if existing > 0 {
            tx.commit().await?;
            return Ok(0);
        }

        let mut inserted = 0usize;
        for tier in tiers {
            sqlx::query(
                r#"
                INSERT INTO shipping_rate_tiers (
                    store_id, marketplace, rate_type, min_value, max_value,
                    cost, vat_included, is_active
                ) VALUES (NULL, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(marketplace.as_str())
            .bind(tier.rate_type.as_str())
            .bind(tier.min_value.to_canonical_string())
            .bind(tier.max_value.to_canonical_string())
            .bind(tier.cost.to_canonical_string())
            .bind(tier.vat_included as i64)
            .bind(tier.is_active as i64)
            .execute(&mut *tx)
            .await?;
            inserted += 1;
        }

        tx.commit().await?;
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::setup_test_db;
    use super::*;
    use crate::domain::Decimal;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn custom_tier(min: &str, max: &str, cost: &str) -> NewShippingRateTier {
        NewShippingRateTier {
            store_id: Some(StoreId::new("store-1".to_string())),
            marketplace: Marketplace::new("trendyol"),
            rate_type: RateType::WeightClass,
            min_value: d(min),
            max_value: d(max),
            cost: d(cost),
            vat_included: true,
            is_active: true,
        }
    }

    fn default_tier(min: &str, max: &str, cost: &str) -> NewShippingRateTier {
        NewShippingRateTier {
            store_id: None,
            ..custom_tier(min, max, cost)
        }
    }

    #[tokio::test]
    async fn test_insert_and_list_visible_tiers() {
        let (repo, _temp) = setup_test_db().await;
        let store = StoreId::new("store-1".to_string());
        let marketplace = Marketplace::new("trendyol");

        repo.insert_tier(&default_tier("0", "1", "27.99"))
            .await
            .unwrap();
        repo.insert_tier(&custom_tier("0", "999999", "19.9"))
            .await
            .unwrap();

        let visible = repo.list_visible_tiers(&store, &marketplace).await.unwrap();
        assert_eq!(visible.len(), 2);
        assert!(visible.iter().any(|t| t.is_custom()));
        assert!(visible.iter().any(|t| !t.is_custom()));
    }

    #[tokio::test]
    async fn test_other_stores_customs_are_invisible() {
        let (repo, _temp) = setup_test_db().await;

        let mut foreign = custom_tier("0", "999999", "5");
        foreign.store_id = Some(StoreId::new("store-2".to_string()));
        repo.insert_tier(&foreign).await.unwrap();

        let visible = repo
            .list_visible_tiers(
                &StoreId::new("store-1".to_string()),
                &Marketplace::new("trendyol"),
            )
            .await
            .unwrap();
        assert!(visible.is_empty());
    }

    #[tokio::test]
    async fn test_custom_writes_bump_revision_defaults_do_not() {
        let (repo, _temp) = setup_test_db().await;
        let store = StoreId::new("store-1".to_string());
        let marketplace = Marketplace::new("trendyol");

        repo.insert_tier(&default_tier("0", "1", "27.99"))
            .await
            .unwrap();
        assert_eq!(repo.get_revision(&store, &marketplace).await.unwrap(), 0);

        repo.insert_tier(&custom_tier("0", "1", "20"))
            .await
            .unwrap();
        assert_eq!(repo.get_revision(&store, &marketplace).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_rejects_default_rows() {
        let (repo, _temp) = setup_test_db().await;

        let default_id = repo
            .insert_tier(&default_tier("0", "1", "27.99"))
            .await
            .unwrap();
        let changed = custom_tier("0", "1", "1");
        assert!(!repo.update_tier(default_id, &changed).await.unwrap());

        let custom_id = repo
            .insert_tier(&custom_tier("0", "1", "20"))
            .await
            .unwrap();
        assert!(repo.update_tier(custom_id, &changed).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_tier_only_touches_customs() {
        let (repo, _temp) = setup_test_db().await;

        let default_id = repo
            .insert_tier(&default_tier("0", "1", "27.99"))
            .await
            .unwrap();
        assert!(!repo.delete_tier(default_id).await.unwrap());

        let custom_id = repo
            .insert_tier(&custom_tier("0", "1", "20"))
            .await
            .unwrap();
        assert!(repo.delete_tier(custom_id).await.unwrap());
        assert!(!repo.delete_tier(custom_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_reset_tiers_deletes_customs_and_keeps_defaults() {
        let (repo, _temp) = setup_test_db().await;
        let store = StoreId::new("store-1".to_string());
        let marketplace = Marketplace::new("trendyol");

        repo.insert_tier(&default_tier("0", "1", "27.99"))
            .await
            .unwrap();
        repo.insert_tier(&custom_tier("0", "1", "20"))
            .await
            .unwrap();
        let mut price_custom = custom_tier("0", "999999", "25");
        price_custom.rate_type = RateType::PriceBand;
        repo.insert_tier(&price_custom).await.unwrap();

        let deleted = repo
            .reset_tiers(&store, &marketplace, Some(RateType::WeightClass))
            .await
            .unwrap();
        assert_eq!(deleted, 1);

        let visible = repo.list_visible_tiers(&store, &marketplace).await.unwrap();
        assert_eq!(visible.len(), 2);
        assert!(visible
            .iter()
            .any(|t| t.rate_type == RateType::PriceBand && t.is_custom()));

        let deleted = repo.reset_tiers(&store, &marketplace, None).await.unwrap();
        assert_eq!(deleted, 1);
    }

    #[tokio::test]
    async fn test_seed_default_tiers_runs_once() {
        let (repo, _temp) = setup_test_db().await;
        let marketplace = Marketplace::new("trendyol");

        let card = vec![
            default_tier("0", "1", "27.99"),
            default_tier("1", "2", "33.49"),
        ];
        let first = repo.seed_default_tiers(&marketplace, &card).await.unwrap();
        assert_eq!(first, 2);

        let second = repo.seed_default_tiers(&marketplace, &card).await.unwrap();
        assert_eq!(second, 0);

        let visible = repo
            .list_visible_tiers(&StoreId::new("store-1".to_string()), &marketplace)
            .await
            .unwrap();
        assert_eq!(visible.len(), 2);
    }
}
