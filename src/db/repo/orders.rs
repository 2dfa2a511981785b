//! Order line recording and queries for the repository.

use crate::domain::{Marketplace, OrderLine, StoreId, TimeMs};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{decimal_column, Repository};

fn map_order_line_row(row: &SqliteRow) -> OrderLine {
    OrderLine {
        id: row.get("id"),
        line_key: row.get("line_key"),
        store_id: StoreId::new(row.get("store_id")),
        marketplace: Marketplace::new(&row.get::<String, _>("marketplace")),
        product_id: row.get("product_id"),
        order_ref: row.get("order_ref"),
        quantity: row.get("quantity"),
        sale_price: decimal_column(row, "sale_price"),
        commission_rate_at_sale: decimal_column(row, "commission_rate_at_sale"),
        shipping_share: decimal_column(row, "shipping_share"),
        net_profit: decimal_column(row, "net_profit"),
        sold_ms: TimeMs::new(row.get("sold_ms")),
        created_ms: TimeMs::new(row.get("created_ms")),
    }
}

impl Repository {
    /// Insert an order line idempotently, keyed by `line_key`.
    ///
    /// Returns true when the row was new. Recording the same sale twice is a
    /// no-op; the first snapshot stands.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn insert_order_line(&self, line: &OrderLine) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO order_lines (
                line_key, store_id, marketplace, product_id, order_ref,
                quantity, sale_price, commission_rate_at_sale, shipping_share,
                net_profit, sold_ms, created_ms
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(line_key) DO NOTHING
            "#,
        )
        .bind(line.line_key.as_str())
        .bind(line.store_id.as_str())
        .bind(line.marketplace.as_str())
        .bind(line.product_id)
        .bind(line.order_ref.as_deref())
        .bind(line.quantity)
        .bind(line.sale_price.to_canonical_string())
        .bind(line.commission_rate_at_sale.to_canonical_string())
        .bind(line.shipping_share.to_canonical_string())
        .bind(line.net_profit.to_canonical_string())
        .bind(line.sold_ms.as_ms())
        .bind(line.created_ms.as_ms())
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Insert multiple order lines in a single transaction.
    ///
    /// Returns the number of newly inserted lines (excludes duplicates).
    ///
    /// # Errors
    /// Returns an error if the transaction fails.
    pub async fn insert_order_lines_batch(
        &self,
        lines: &[OrderLine],
    ) -> Result<usize, sqlx::Error> {
        if lines.is_empty() {
            return Ok(0);
        }

        let mut total_inserted = 0usize;
        let mut tx = self.pool().begin().await?;

        for line in lines {
            let result = sqlx::query(
                r#"
                INSERT INTO order_lines (
                    line_key, store_id, marketplace, product_id, order_ref,
                    quantity, sale_price, commission_rate_at_sale, shipping_share,
                    net_profit, sold_ms, created_ms
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(line_key) DO NOTHING
                "#,
            )
            .bind(line.line_key.as_str())
            .bind(line.store_id.as_str())
            .bind(line.marketplace.as_str())
            .bind(line.product_id)
            .bind(line.order_ref.as_deref())
            .bind(line.quantity)
            .bind(line.sale_price.to_canonical_string())
            .bind(line.commission_rate_at_sale.to_canonical_string())
            .bind(line.shipping_share.to_canonical_string())
            .bind(line.net_profit.to_canonical_string())
            .bind(line.sold_ms.as_ms())
            .bind(line.created_ms.as_ms())
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() > 0 {
                total_inserted += 1;
            }
        }

        tx.commit().await?;
        Ok(total_inserted)
    }

    /// Query order lines for a store within a time range, optionally pinned
    /// to one marketplace. Deterministic order: sale time, then row id.
    pub async fn query_order_lines(
        &self,
        store_id: &StoreId,
        marketplace: Option<&Marketplace>,
        from_ms: TimeMs,
        to_ms: TimeMs,
    ) -> Result<Vec<OrderLine>, sqlx::Error> {
        let rows = match marketplace {
            Some(marketplace) => {
                sqlx::query(
                    r#"
                    SELECT id, line_key, store_id, marketplace, product_id, order_ref,
                           quantity, sale_price, commission_rate_at_sale, shipping_share,
                           net_profit, sold_ms, created_ms
                    FROM order_lines
                    WHERE store_id = ? AND marketplace = ? AND sold_ms >= ? AND sold_ms <= ?
                    ORDER BY sold_ms ASC, id ASC
                    "#,
                )
                .bind(store_id.as_str())
                .bind(marketplace.as_str())
                .bind(from_ms.as_ms())
                .bind(to_ms.as_ms())
                .fetch_all(self.pool())
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT id, line_key, store_id, marketplace, product_id, order_ref,
                           quantity, sale_price, commission_rate_at_sale, shipping_share,
                           net_profit, sold_ms, created_ms
                    FROM order_lines
                    WHERE store_id = ? AND sold_ms >= ? AND sold_ms <= ?
                    ORDER BY sold_ms ASC, id ASC
                    "#,
                )
                .bind(store_id.as_str())
                .bind(from_ms.as_ms())
                .bind(to_ms.as_ms())
                .fetch_all(self.pool())
                .await?
            }
        };

        Ok(rows.iter().map(map_order_line_row).collect())
    }
}
