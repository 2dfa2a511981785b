//! Composition layer: one product's fully-resolved financial view.

use crate::domain::{CommissionSchedule, Decimal, Product, TimeMs};
use crate::engine::commission::{resolve_commission_rate, CommissionResolution};
use crate::engine::profit::{calculate_profit, ProfitBreakdown, ProfitInput};
use crate::engine::shipping::ShippingRateTable;
use serde::{Deserialize, Serialize};

/// The derived financial view of one product at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFinancials {
    pub product_id: i64,
    /// The commission that applied, campaign or fallback.
    pub commission: CommissionResolution,
    /// The shipping cost that fed the breakdown (override or table lookup).
    pub resolved_shipping_cost: Decimal,
    /// Full cost/profit breakdown at the product's current sales price.
    pub profit: ProfitBreakdown,
}

/// Resolve one product against the reference data in one pass.
///
/// A manual `shipping_cost` override on the product (> 0) is used verbatim
/// and the rate table is never consulted; otherwise the table resolves
/// `(desi, sales_price)`. The product's own `commission_rate` is the
/// fallback when no campaign wins at `now`.
pub fn resolve_product_financials(
    product: &Product,
    table: &ShippingRateTable,
    schedules: &[CommissionSchedule],
    now: TimeMs,
) -> ProductFinancials {
    let resolved_shipping_cost = if product.has_shipping_override() {
        product.shipping_cost
    } else {
        table.resolve(product.desi, product.sales_price)
    };

    let commission = resolve_commission_rate(
        product.id,
        &product.marketplace,
        schedules,
        product.commission_rate,
        now,
    );

    let profit = calculate_profit(&ProfitInput {
        sales_price: product.sales_price,
        buy_price: product.buy_price,
        commission_rate: commission.rate,
        vat_rate: product.vat_rate,
        shipping_cost: resolved_shipping_cost,
        extra_cost: product.extra_cost,
        ad_cost: product.ad_cost,
        packaging_cost: product.packaging_cost,
        packaging_vat_included: product.packaging_vat_included,
        return_rate: product.return_rate,
        service_fee: product.service_fee,
    });

    ProductFinancials {
        product_id: product.id,
        commission,
        resolved_shipping_cost,
        profit,
    }
}

/// The profit input a product resolves to, for callers that want to perturb
/// it (price simulation) rather than publish it.
pub fn profit_input_for(
    product: &Product,
    table: &ShippingRateTable,
    schedules: &[CommissionSchedule],
    now: TimeMs,
) -> ProfitInput {
    let financials = resolve_product_financials(product, table, schedules, now);
    ProfitInput {
        sales_price: product.sales_price,
        buy_price: product.buy_price,
        commission_rate: financials.commission.rate,
        vat_rate: product.vat_rate,
        shipping_cost: financials.resolved_shipping_cost,
        extra_cost: product.extra_cost,
        ad_cost: product.ad_cost,
        packaging_cost: product.packaging_cost,
        packaging_vat_included: product.packaging_vat_included,
        return_rate: product.return_rate,
        service_fee: product.service_fee,
    }
}
