//! Pure cost/profit breakdown calculator.

use crate::domain::Decimal;
use serde::{Deserialize, Serialize};

/// Fully-resolved cost inputs for one unit of one product.
///
/// Every field defaults to zero (`Default`), matching the rule that an
/// absent numeric input means "no such cost". `commission_rate` is a
/// fraction; `vat_rate` and `return_rate` are percentage points.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfitInput {
    pub sales_price: Decimal,
    pub buy_price: Decimal,
    pub commission_rate: Decimal,
    pub vat_rate: Decimal,
    pub shipping_cost: Decimal,
    pub extra_cost: Decimal,
    pub ad_cost: Decimal,
    pub packaging_cost: Decimal,
    pub packaging_vat_included: bool,
    pub return_rate: Decimal,
    pub service_fee: Decimal,
}

impl ProfitInput {
    /// Same input with only the sales price replaced.
    pub fn with_sales_price(&self, sales_price: Decimal) -> Self {
        ProfitInput {
            sales_price,
            ..self.clone()
        }
    }
}

/// Complete published cost breakdown for one unit.
///
/// Monetary fields carry 2 decimal places, `margin` and `roi` carry 1.
/// Each value is rounded exactly once, from the full-precision
/// intermediate, at the moment this struct is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitBreakdown {
    pub sales_price: Decimal,
    pub buy_price: Decimal,
    pub vat: Decimal,
    pub commission: Decimal,
    pub shipping_cost: Decimal,
    pub extra_cost: Decimal,
    pub ad_cost: Decimal,
    /// The effective packaging cost, grossed up when the input was entered
    /// VAT-exclusive.
    pub packaging_cost: Decimal,
    pub return_cost: Decimal,
    pub service_fee: Decimal,
    pub total_cost: Decimal,
    pub net_profit: Decimal,
    /// Net profit as a percentage of sales price; zero when sales price is.
    pub margin: Decimal,
    /// Net profit as a percentage of buy price; zero when buy price is.
    pub roi: Decimal,
}

/// Flat VAT grossing factor applied to VAT-exclusive packaging costs.
fn packaging_vat_factor() -> Decimal {
    Decimal::from_str_canonical("1.20").unwrap_or_else(|_| Decimal::one())
}

/// Compute the full cost/profit breakdown for one unit.
///
/// Total over its whole input domain: negative and zero inputs are valid
/// (a negative net profit is how a loss is reported), and nothing here can
/// fail or depend on anything but the arguments. Intermediates stay at full
/// precision; rounding happens once per published field.
pub fn calculate_profit(input: &ProfitInput) -> ProfitBreakdown {
    let hundred = Decimal::hundred();

    let vat = input.sales_price * (input.vat_rate / hundred);
    let commission = input.sales_price * input.commission_rate;
    let packaging_effective = if input.packaging_vat_included {
        input.packaging_cost
    } else {
        input.packaging_cost * packaging_vat_factor()
    };
    let return_cost = input.sales_price * (input.return_rate / hundred);

    let total_cost = input.buy_price
        + vat
        + commission
        + input.shipping_cost
        + input.extra_cost
        + input.ad_cost
        + packaging_effective
        + return_cost
        + input.service_fee;
    let net_profit = input.sales_price - total_cost;

    let margin = if input.sales_price > Decimal::zero() {
        (net_profit / input.sales_price * hundred).round1()
    } else {
        Decimal::zero()
    };
    let roi = if input.buy_price > Decimal::zero() {
        (net_profit / input.buy_price * hundred).round1()
    } else {
        Decimal::zero()
    };

    ProfitBreakdown {
        sales_price: input.sales_price.round2(),
        buy_price: input.buy_price.round2(),
        vat: vat.round2(),
        commission: commission.round2(),
        shipping_cost: input.shipping_cost.round2(),
        extra_cost: input.extra_cost.round2(),
        ad_cost: input.ad_cost.round2(),
        packaging_cost: packaging_effective.round2(),
        return_cost: return_cost.round2(),
        service_fee: input.service_fee.round2(),
        total_cost: total_cost.round2(),
        net_profit: net_profit.round2(),
        margin,
        roi,
    }
}
