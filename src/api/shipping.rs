use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{parse_scope, AppState};
use crate::domain::{
    Decimal, Marketplace, NewShippingRateTier, RateType, ShippingRateTier, StoreId, UNBOUNDED_MAX,
};
use crate::engine::ShippingRateTable;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TiersQuery {
    pub store_id: String,
    pub marketplace: String,
}

/// Custom tier payload. Bounds and cost are required; a band with no
/// upper limit uses the sentinel (`maxValue >= 999999`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierBody {
    pub store_id: String,
    pub marketplace: String,
    pub rate_type: RateType,
    pub min_value: Decimal,
    pub max_value: Decimal,
    pub cost: Decimal,
    pub vat_included: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetBody {
    pub store_id: String,
    pub marketplace: String,
    /// Reset one axis only when given, both otherwise.
    pub rate_type: Option<RateType>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TiersResponse {
    /// The set lookups actually use, customs already shadowing defaults.
    pub tiers: Vec<ShippingRateTier>,
}

fn to_new_tier(
    body: &TierBody,
    store_id: StoreId,
    marketplace: Marketplace,
) -> Result<NewShippingRateTier, AppError> {
    if body.min_value.is_negative() {
        return Err(AppError::BadRequest("minValue must be >= 0".to_string()));
    }
    if body.max_value <= body.min_value {
        return Err(AppError::BadRequest(
            "maxValue must be greater than minValue".to_string(),
        ));
    }
    if body.cost.is_negative() {
        return Err(AppError::BadRequest("cost must be >= 0".to_string()));
    }

    Ok(NewShippingRateTier {
        store_id: Some(store_id),
        marketplace,
        rate_type: body.rate_type,
        min_value: body.min_value,
        max_value: body.max_value,
        cost: body.cost,
        vat_included: body.vat_included.unwrap_or(true),
        is_active: body.is_active.unwrap_or(true),
    })
}

/// Two half-open bands on the same axis overlap when each starts below the
/// other's end. An unbounded band has no end.
fn bands_overlap(candidate: &NewShippingRateTier, existing: &ShippingRateTier) -> bool {
    let candidate_unbounded = candidate.max_value >= Decimal::from(UNBOUNDED_MAX);
    let candidate_starts_below_end =
        existing.is_unbounded() || candidate.min_value < existing.max_value;
    let existing_starts_below_end =
        candidate_unbounded || existing.min_value < candidate.max_value;
    candidate_starts_below_end && existing_starts_below_end
}

/// Reject a write that would break the non-overlap invariant within the
/// store's custom partition for this axis. Inactive rows stay out of
/// lookup, so they do not participate.
async fn ensure_no_overlap(
    state: &AppState,
    store_id: &StoreId,
    marketplace: &Marketplace,
    candidate: &NewShippingRateTier,
    exclude_id: Option<i64>,
) -> Result<(), AppError> {
    if !candidate.is_active {
        return Ok(());
    }

    let rows = state.repo.list_visible_tiers(store_id, marketplace).await?;
    let conflict = rows.iter().find(|t| {
        t.is_custom()
            && t.is_active
            && t.rate_type == candidate.rate_type
            && Some(t.id) != exclude_id
            && bands_overlap(candidate, t)
    });

    if let Some(t) = conflict {
        return Err(AppError::BadRequest(format!(
            "Band [{}, {}) overlaps existing tier {}",
            candidate.min_value, candidate.max_value, t.id
        )));
    }
    Ok(())
}

/// The tier set in effect for a scope, customs already shadowing defaults.
pub async fn list_tiers(
    Query(params): Query<TiersQuery>,
    State(state): State<AppState>,
) -> Result<Json<TiersResponse>, AppError> {
    let (store_id, marketplace) = parse_scope(&params.store_id, &params.marketplace)?;

    let rows = state.repo.list_visible_tiers(&store_id, &marketplace).await?;
    let table = ShippingRateTable::from_rows(rows);

    Ok(Json(TiersResponse {
        tiers: table.tiers().to_vec(),
    }))
}

pub async fn create_tier(
    State(state): State<AppState>,
    Json(body): Json<TierBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (store_id, marketplace) = parse_scope(&body.store_id, &body.marketplace)?;
    let tier = to_new_tier(&body, store_id.clone(), marketplace.clone())?;

    ensure_no_overlap(&state, &store_id, &marketplace, &tier, None).await?;
    let id = state.repo.insert_tier(&tier).await?;

    Ok(Json(serde_json::json!({"id": id})))
}

/// Replace a custom tier. The body carries the tier's own scope; the
/// overlap check runs against that partition with this row excluded.
pub async fn update_tier(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(body): Json<TierBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (store_id, marketplace) = parse_scope(&body.store_id, &body.marketplace)?;
    let tier = to_new_tier(&body, store_id.clone(), marketplace.clone())?;

    ensure_no_overlap(&state, &store_id, &marketplace, &tier, Some(id)).await?;
    let updated = state.repo.update_tier(id, &tier).await?;
    if !updated {
        return Err(AppError::NotFound(format!("No custom tier with id {}", id)));
    }

    Ok(Json(serde_json::json!({"updated": true})))
}

pub async fn delete_tier(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let deleted = state.repo.delete_tier(id).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("No custom tier with id {}", id)));
    }
    Ok(Json(serde_json::json!({"deleted": true})))
}

/// Delete the store's custom rows so the marketplace defaults apply again.
pub async fn reset_tiers(
    State(state): State<AppState>,
    Json(body): Json<ResetBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (store_id, marketplace) = parse_scope(&body.store_id, &body.marketplace)?;
    let deleted = state
        .repo
        .reset_tiers(&store_id, &marketplace, body.rate_type)
        .await?;

    Ok(Json(serde_json::json!({"deleted": deleted})))
}
