//! Tiered shipping-rate lookup over the two banding axes.

use crate::domain::{Decimal, RateType, ShippingRateTier};

/// Resolve a shipping cost from a tier set, given a desi value and a sales price.
///
/// The set is taken as given: custom-over-default precedence is applied when
/// the set is loaded (see [`ShippingRateTable::from_rows`]), not here. Both
/// axes are evaluated independently against their own tiers; when both match,
/// the numerically lower cost wins. When neither matches the result is zero,
/// a deliberate fail-open default so a gap in the rate card never blocks a
/// profit calculation.
pub fn resolve_shipping_cost(
    desi: Decimal,
    sales_price: Decimal,
    tiers: &[ShippingRateTier],
) -> Decimal {
    // Desi values at or below zero are classed into the first weight band.
    let desi = if desi > Decimal::zero() {
        desi
    } else {
        Decimal::one()
    };

    let weight_candidate = match_axis(tiers, RateType::WeightClass, desi);
    let price_candidate = match_axis(tiers, RateType::PriceBand, sales_price);

    match (weight_candidate, price_candidate) {
        (Some(w), Some(p)) => {
            if p < w {
                p
            } else {
                w
            }
        }
        (Some(w), None) => w,
        (None, Some(p)) => p,
        (None, None) => Decimal::zero(),
    }
}

/// Find the matching band cost on one axis. Inactive tiers never match.
fn match_axis(tiers: &[ShippingRateTier], rate_type: RateType, value: Decimal) -> Option<Decimal> {
    tiers
        .iter()
        .filter(|t| t.is_active && t.rate_type == rate_type)
        .find(|t| t.contains(value))
        .map(|t| t.cost)
}

/// The tier set visible to one store on one marketplace, with custom rows
/// already shadowing defaults.
///
/// Shadowing is per axis: a seller with custom desi bands but no custom
/// price bands keeps the default price bands.
#[derive(Debug, Clone, Default)]
pub struct ShippingRateTable {
    visible: Vec<ShippingRateTier>,
}

impl ShippingRateTable {
    /// Build the visible tier set from raw rows (customs and defaults mixed).
    ///
    /// For each rate type, custom rows replace the defaults entirely when at
    /// least one custom row of that type exists. Within each axis, tiers are
    /// sorted ascending by `min_value`, with id as a deterministic fallback.
    pub fn from_rows(rows: Vec<ShippingRateTier>) -> Self {
        let mut visible = Vec::with_capacity(rows.len());
        for rate_type in [RateType::WeightClass, RateType::PriceBand] {
            let has_custom = rows
                .iter()
                .any(|t| t.rate_type == rate_type && t.is_custom());
            let mut axis: Vec<ShippingRateTier> = rows
                .iter()
                .filter(|t| t.rate_type == rate_type && (t.is_custom() == has_custom))
                .cloned()
                .collect();
            axis.sort_by(|a, b| (a.min_value, a.id).cmp(&(b.min_value, b.id)));
            visible.extend(axis);
        }
        ShippingRateTable { visible }
    }

    /// Resolve `(desi, sales_price)` to a shipping cost.
    pub fn resolve(&self, desi: Decimal, sales_price: Decimal) -> Decimal {
        resolve_shipping_cost(desi, sales_price, &self.visible)
    }

    /// The tier rows in effect, in lookup order.
    pub fn tiers(&self) -> &[ShippingRateTier] {
        &self.visible
    }

    /// True when no tier is visible at all.
    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }
}
