//! Product type: the per-unit commerce record whose financials get resolved.

use crate::domain::{Decimal, Marketplace, StoreId, TimeMs};
use serde::{Deserialize, Serialize};

/// A tracked marketplace listing with its per-unit cost drivers.
///
/// The resolved profit/commission for a product is a derived view, never
/// stored on this record. Absent numeric inputs default to zero, which the
/// calculator treats as "no such cost".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Row id assigned by the store.
    pub id: i64,
    /// Owning seller store.
    pub store_id: StoreId,
    /// Marketplace channel the listing lives on.
    pub marketplace: Marketplace,
    /// Display name.
    pub name: String,
    /// Category label, free text.
    pub category: Option<String>,
    /// Marketplace listing id / barcode, when known.
    pub external_id: Option<String>,
    /// Acquisition cost per unit.
    pub buy_price: Decimal,
    /// Listed sales price per unit.
    pub sales_price: Decimal,
    /// The product's own normal commission rate, a fraction in [0,1).
    /// Used as the fallback when no campaign wins.
    pub commission_rate: Decimal,
    /// VAT rate in percentage points (20 means 20%).
    pub vat_rate: Decimal,
    /// Volumetric weight class used for shipping tier lookup.
    pub desi: Decimal,
    /// Manual shipping cost override. Zero means "resolve from the rate table".
    pub shipping_cost: Decimal,
    /// Miscellaneous per-unit cost.
    pub extra_cost: Decimal,
    /// Advertising spend amortized per unit.
    pub ad_cost: Decimal,
    /// Packaging cost per unit, as entered.
    pub packaging_cost: Decimal,
    /// Whether `packaging_cost` was entered VAT-inclusive.
    pub packaging_vat_included: bool,
    /// Expected returns, in percentage points of sales price.
    pub return_rate: Decimal,
    /// Marketplace service fee per unit.
    pub service_fee: Decimal,
    /// Creation time.
    pub created_ms: TimeMs,
    /// Last modification time.
    pub updated_ms: TimeMs,
}

impl Product {
    /// True when the seller pinned a manual shipping cost, which bypasses
    /// rate-table resolution entirely.
    pub fn has_shipping_override(&self) -> bool {
        self.shipping_cost.is_positive()
    }
}

/// Field set for creating or replacing a product row.
///
/// Identical to [`Product`] minus the store-assigned id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub store_id: StoreId,
    pub marketplace: Marketplace,
    pub name: String,
    pub category: Option<String>,
    pub external_id: Option<String>,
    pub buy_price: Decimal,
    pub sales_price: Decimal,
    pub commission_rate: Decimal,
    pub vat_rate: Decimal,
    pub desi: Decimal,
    pub shipping_cost: Decimal,
    pub extra_cost: Decimal,
    pub ad_cost: Decimal,
    pub packaging_cost: Decimal,
    pub packaging_vat_included: bool,
    pub return_rate: Decimal,
    pub service_fee: Decimal,
}
