//! Pure computation engine for deterministic financial resolution.
//!
//! Every function here is synchronous arithmetic over in-memory inputs:
//! no I/O, no clock reads, no shared state. Callers supply `now` and a
//! consistent snapshot of the reference data.

pub mod commission;
pub mod financials;
pub mod profit;
pub mod shipping;
pub mod simulate;

pub use commission::{resolve_commission_rate, CommissionResolution};
pub use financials::{profit_input_for, resolve_product_financials, ProductFinancials};
pub use profit::{calculate_profit, ProfitBreakdown, ProfitInput};
pub use shipping::{resolve_shipping_cost, ShippingRateTable};
pub use simulate::{simulate_price_change, PriceScenario};
