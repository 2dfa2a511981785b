//! What-if price simulation over the profit calculator.

use crate::domain::Decimal;
use crate::engine::profit::{calculate_profit, ProfitBreakdown, ProfitInput};
use serde::{Deserialize, Serialize};

/// Side-by-side breakdowns for the current and a hypothetical sales price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceScenario {
    /// Breakdown at the input's own sales price.
    pub current: ProfitBreakdown,
    /// Breakdown with only the sales price replaced.
    pub simulated: ProfitBreakdown,
    /// `simulated.net_profit - current.net_profit`, rounded to 2 decimals.
    pub profit_delta: Decimal,
}

/// Answer "what if only the sales price changed?".
///
/// Every other cost driver stays fixed at the base input's resolved value.
/// Deliberately no re-resolution of commission or shipping for the target
/// price: this isolates price elasticity from schedule and price-band
/// effects, which a caller re-resolves separately when the target price
/// would cross a band.
pub fn simulate_price_change(base: &ProfitInput, target_price: Decimal) -> PriceScenario {
    let current = calculate_profit(base);
    let simulated = calculate_profit(&base.with_sales_price(target_price));
    let profit_delta = (simulated.net_profit - current.net_profit).round2();

    PriceScenario {
        current,
        simulated,
        profit_delta,
    }
}
