use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use super::AppState;
use crate::domain::{Decimal, TimeMs};
use crate::engine::{profit_input_for, simulate_price_change, PriceScenario, ProfitInput, ShippingRateTable};
use crate::error::AppError;

/// What-if request: either a stored product (inputs resolved server-side,
/// as of now) or a fully inline input set. Exactly one of the two.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateBody {
    pub product_id: Option<i64>,
    pub input: Option<ProfitInput>,
    pub target_price: Decimal,
}

pub async fn simulate_price(
    State(state): State<AppState>,
    Json(body): Json<SimulateBody>,
) -> Result<Json<PriceScenario>, AppError> {
    let input = match (body.product_id, body.input) {
        (Some(id), None) => {
            let product = state
                .repo
                .get_product(id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("No product with id {}", id)))?;

            let tiers = state
                .repo
                .list_visible_tiers(&product.store_id, &product.marketplace)
                .await?;
            let schedules = state
                .repo
                .list_schedules(&product.store_id, &product.marketplace)
                .await?;

            let table = ShippingRateTable::from_rows(tiers);
            profit_input_for(&product, &table, &schedules, TimeMs::now())
        }
        (None, Some(input)) => input,
        _ => {
            return Err(AppError::BadRequest(
                "Provide exactly one of productId or input".to_string(),
            ))
        }
    };

    Ok(Json(simulate_price_change(&input, body.target_price)))
}
