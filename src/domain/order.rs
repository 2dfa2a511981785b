//! Order line: a point-in-time snapshot of one sale's resolved economics.

use crate::domain::{Decimal, Marketplace, StoreId, TimeMs};
use serde::{Deserialize, Serialize};

/// One recorded sale line with its financials frozen at sale time.
///
/// `commission_rate_at_sale`, `shipping_share` and `net_profit` are captured
/// when the line is recorded and never recomputed: later edits to schedules
/// or rate tables must not rewrite a historical order's profit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    /// Row id assigned by the store.
    pub id: i64,
    /// Stable unique identifier for this line, used for idempotent recording.
    pub line_key: String,
    /// Owning seller store.
    pub store_id: StoreId,
    /// Marketplace the sale happened on.
    pub marketplace: Marketplace,
    /// The product sold.
    pub product_id: i64,
    /// Marketplace order reference, when the source supplies one.
    pub order_ref: Option<String>,
    /// Units sold on this line.
    pub quantity: i64,
    /// Unit sales price at the moment of sale.
    pub sale_price: Decimal,
    /// The commission fraction that actually applied at sale time.
    pub commission_rate_at_sale: Decimal,
    /// Shipping cost attributed to one unit of this line.
    pub shipping_share: Decimal,
    /// Net profit for the whole line (per-unit profit times quantity),
    /// already rounded to 2 decimal places.
    pub net_profit: Decimal,
    /// When the sale happened.
    pub sold_ms: TimeMs,
    /// When the line was recorded.
    pub created_ms: TimeMs,
}

impl OrderLine {
    /// Generate a stable unique key for an order line.
    ///
    /// Priority: the marketplace `order_ref` (if present) > hash of
    /// deterministic fields.
    pub fn compute_line_key(
        order_ref: Option<&str>,
        store_id: &StoreId,
        marketplace: &Marketplace,
        product_id: i64,
        sold_ms: TimeMs,
        quantity: i64,
        sale_price: &Decimal,
    ) -> String {
        if let Some(order_ref) = order_ref {
            if !order_ref.is_empty() {
                return format!("ref:{}:{}", order_ref, product_id);
            }
        }

        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        hasher.update(store_id.as_str());
        hasher.update(marketplace.as_str());
        hasher.update(product_id.to_le_bytes());
        hasher.update(sold_ms.as_ms().to_le_bytes());
        hasher.update(quantity.to_le_bytes());
        hasher.update(sale_price.to_canonical_string());
        let hash = hasher.finalize();
        format!("hash:{}", hex::encode(&hash[..16]))
    }
}
