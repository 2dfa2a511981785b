//! Product CRUD operations for the repository.

use crate::domain::{Marketplace, NewProduct, Product, StoreId, TimeMs};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{bump_revision, decimal_column, Repository};

fn map_product_row(row: &SqliteRow) -> Product {
    Product {
        id: row.get("id"),
        store_id: StoreId::new(row.get("store_id")),
        marketplace: Marketplace::new(&row.get::<String, _>("marketplace")),
        name: row.get("name"),
        category: row.get("category"),
        external_id: row.get("external_id"),
        buy_price: decimal_column(row, "buy_price"),
        sales_price: decimal_column(row, "sales_price"),
        commission_rate: decimal_column(row, "commission_rate"),
        vat_rate: decimal_column(row, "vat_rate"),
        desi: decimal_column(row, "desi"),
        shipping_cost: decimal_column(row, "shipping_cost"),
        extra_cost: decimal_column(row, "extra_cost"),
        ad_cost: decimal_column(row, "ad_cost"),
        packaging_cost: decimal_column(row, "packaging_cost"),
        packaging_vat_included: row.get::<i64, _>("packaging_vat_included") != 0,
        return_rate: decimal_column(row, "return_rate"),
        service_fee: decimal_column(row, "service_fee"),
        created_ms: TimeMs::new(row.get("created_ms")),
        updated_ms: TimeMs::new(row.get("updated_ms")),
    }
}

impl Repository {
    /// Insert a product and bump the scope's reference revision atomically.
    ///
    /// Returns the assigned row id.
    ///
    /// # Errors
    /// Returns an error if the transaction fails.
    pub async fn insert_product(&self, product: &NewProduct) -> Result<i64, sqlx::Error> {
        let now = chrono::Utc::now().timestamp_millis();
        let mut tx = self.pool().begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO products (
                store_id, marketplace, name, category, external_id,
                buy_price, sales_price, commission_rate, vat_rate, desi,
                shipping_cost, extra_cost, ad_cost, packaging_cost,
                packaging_vat_included, return_rate, service_fee,
                created_ms, updated_ms
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(product.store_id.as_str())
        .bind(product.marketplace.as_str())
        .bind(&product.name)
        .bind(product.category.as_deref())
        .bind(product.external_id.as_deref())
        .bind(product.buy_price.to_canonical_string())
        .bind(product.sales_price.to_canonical_string())
        .bind(product.commission_rate.to_canonical_string())
        .bind(product.vat_rate.to_canonical_string())
        .bind(product.desi.to_canonical_string())
        .bind(product.shipping_cost.to_canonical_string())
        .bind(product.extra_cost.to_canonical_string())
        .bind(product.ad_cost.to_canonical_string())
        .bind(product.packaging_cost.to_canonical_string())
        .bind(product.packaging_vat_included as i64)
        .bind(product.return_rate.to_canonical_string())
        .bind(product.service_fee.to_canonical_string())
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        bump_revision(&mut tx, &product.store_id, &product.marketplace).await?;
        tx.commit().await?;

        Ok(result.last_insert_rowid())
    }

    /// Replace a product's mutable fields, keyed by id.
    ///
    /// Returns false when the row does not exist. The scope revision is
    /// bumped in the same transaction.
    pub async fn update_product(&self, id: i64, product: &NewProduct) -> Result<bool, sqlx::Error> {
        let now = chrono::Utc::now().timestamp_millis();
        let mut tx = self.pool().begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?, category = ?, external_id = ?,
                buy_price = ?, sales_price = ?, commission_rate = ?,
                vat_rate = ?, desi = ?, shipping_cost = ?, extra_cost = ?,
                ad_cost = ?, packaging_cost = ?, packaging_vat_included = ?,
                return_rate = ?, service_fee = ?, updated_ms = ?
            WHERE id = ? AND store_id = ? AND marketplace = ?
            "#,
        )
        .bind(&product.name)
        .bind(product.category.as_deref())
        .bind(product.external_id.as_deref())
        .bind(product.buy_price.to_canonical_string())
        .bind(product.sales_price.to_canonical_string())
        .bind(product.commission_rate.to_canonical_string())
        .bind(product.vat_rate.to_canonical_string())
        .bind(product.desi.to_canonical_string())
        .bind(product.shipping_cost.to_canonical_string())
        .bind(product.extra_cost.to_canonical_string())
        .bind(product.ad_cost.to_canonical_string())
        .bind(product.packaging_cost.to_canonical_string())
        .bind(product.packaging_vat_included as i64)
        .bind(product.return_rate.to_canonical_string())
        .bind(product.service_fee.to_canonical_string())
        .bind(now)
        .bind(id)
        .bind(product.store_id.as_str())
        .bind(product.marketplace.as_str())
        .execute(&mut *tx)
        .await?;

        let updated = result.rows_affected() > 0;
        if updated {
            bump_revision(&mut tx, &product.store_id, &product.marketplace).await?;
        }
        tx.commit().await?;

        Ok(updated)
    }

    /// Delete a product. Returns false when the row does not exist.
    pub async fn delete_product(&self, id: i64) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool().begin().await?;

        let row = sqlx::query("SELECT store_id, marketplace FROM products WHERE id = ?")
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

        sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        bump_revision(&mut tx, &store_id, &marketplace).await?;
        tx.commit().await?;

        Ok(true)
    }

    /// Fetch one product by id.
    pub async fn get_product(&self, id: i64) -> Result<Option<Product>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, store_id, marketplace, name, category, external_id,
                   buy_price, sales_price, commission_rate, vat_rate, desi,
                   shipping_cost, extra_cost, ad_cost, packaging_cost,
                   packaging_vat_included, return_rate, service_fee,
                   created_ms, updated_ms
            FROM products WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.as_ref().map(map_product_row))
    }

    /// List all products in a store+marketplace scope, oldest first.
    pub async fn list_products(
        &self,
        store_id: &StoreId,
        marketplace: &Marketplace,
    ) -> Result<Vec<Product>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, store_id, marketplace, name, category, external_id,
                   buy_price, sales_price, commission_rate, vat_rate, desi,
                   shipping_cost, extra_cost, ad_cost, packaging_cost,
                   packaging_vat_included, return_rate, service_fee,
                   created_ms, updated_ms
            FROM products
            WHERE store_id = ? AND marketplace = ?
            ORDER BY id ASC
            "#,
        )
        .bind(store_id.as_str())
        .bind(marketplace.as_str())
        .fetch_all(self.pool())
        .await?;

        Ok(rows.iter().map(map_product_row).collect())
    }

    /// Distinct marketplaces a store has products in.
    ///
    /// Used to fan an unscoped analytics query out across every
    /// marketplace the store sells on.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn list_store_marketplaces(
        &self,
        store_id: &StoreId,
    ) -> Result<Vec<Marketplace>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT marketplace
            FROM products
            WHERE store_id = ?
            ORDER BY marketplace ASC
            "#,
        )
        .bind(store_id.as_str())
        .fetch_all(self.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Marketplace::new(&row.get::<String, _>("marketplace")))
            .collect())
    }
}
