//! Shipping rate tier: one band of a tiered ("barem") carrier rate table.

use crate::domain::{Decimal, Marketplace, StoreId};
use serde::{Deserialize, Serialize};

/// Any `max_value` at or above this sentinel marks the top tier as unbounded.
pub const UNBOUNDED_MAX: i64 = 999_999;

/// Which axis a tier bands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RateType {
    /// Banded by the desi (volumetric weight) classification.
    #[serde(rename = "desi")]
    WeightClass,
    /// Banded by the product's sales price.
    #[serde(rename = "price")]
    PriceBand,
}

impl RateType {
    /// Stable string used in storage and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            RateType::WeightClass => "desi",
            RateType::PriceBand => "price",
        }
    }

    /// Parse the storage string form.
    pub fn parse(s: &str) -> Option<RateType> {
        match s {
            "desi" => Some(RateType::WeightClass),
            "price" => Some(RateType::PriceBand),
            _ => None,
        }
    }
}

impl std::fmt::Display for RateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One rate band: `[min_value, max_value)` on the tier's axis, with a cost.
///
/// Tiers with a `store_id` are seller-defined customs; `None` marks a
/// marketplace-wide default row. Within one `(store, marketplace, rate_type)`
/// partition tiers must not overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingRateTier {
    /// Row id assigned by the store.
    pub id: i64,
    /// Owning store, or `None` for a marketplace default.
    pub store_id: Option<StoreId>,
    /// Marketplace the rate card belongs to.
    pub marketplace: Marketplace,
    /// Banding axis.
    pub rate_type: RateType,
    /// Band lower bound (inclusive).
    pub min_value: Decimal,
    /// Band upper bound (exclusive). At or above [`UNBOUNDED_MAX`] the band
    /// is open-ended upward.
    pub max_value: Decimal,
    /// Shipping cost charged within this band.
    pub cost: Decimal,
    /// Whether `cost` is quoted VAT-inclusive. Informational; the calculator
    /// never grosses it up.
    pub vat_included: bool,
    /// Inactive tiers are ignored by lookup.
    pub is_active: bool,
}

impl ShippingRateTier {
    /// True when this is the open-ended top band.
    pub fn is_unbounded(&self) -> bool {
        self.max_value >= Decimal::from(UNBOUNDED_MAX)
    }

    /// Interval test: `min_value <= value`, and `value < max_value` unless
    /// the band is unbounded.
    pub fn contains(&self, value: Decimal) -> bool {
        if value < self.min_value {
            return false;
        }
        self.is_unbounded() || value < self.max_value
    }

    /// True when the row is a seller-defined custom (not a default).
    pub fn is_custom(&self) -> bool {
        self.store_id.is_some()
    }
}

/// Field set for creating or replacing a custom tier row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewShippingRateTier {
    pub store_id: Option<StoreId>,
    pub marketplace: Marketplace,
    pub rate_type: RateType,
    pub min_value: Decimal,
    pub max_value: Decimal,
    pub cost: Decimal,
    pub vat_included: bool,
    pub is_active: bool,
}
