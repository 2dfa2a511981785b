use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{parse_scope, AppState};
use crate::domain::{CommissionSchedule, Decimal, NewCommissionSchedule, ScheduleState, TimeMs};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulesQuery {
    pub store_id: String,
    pub marketplace: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleBody {
    pub store_id: String,
    pub marketplace: String,
    /// Store-wide campaign when absent, product-scoped when set.
    pub product_id: Option<i64>,
    pub normal_rate: Option<Decimal>,
    pub campaign_rate: Decimal,
    pub campaign_name: String,
    pub valid_from: i64,
    pub valid_until: i64,
    pub seller_discount_share: Option<Decimal>,
    pub marketplace_discount_share: Option<Decimal>,
    pub is_active: Option<bool>,
}

/// Template create: a campaign running from now for a fixed duration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickScheduleBody {
    pub store_id: String,
    pub marketplace: String,
    pub product_id: Option<i64>,
    pub campaign_rate: Decimal,
    pub campaign_name: Option<String>,
    pub duration_hours: i64,
    pub normal_rate: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct ScheduleWithState {
    #[serde(flatten)]
    pub schedule: CommissionSchedule,
    pub state: ScheduleState,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulesResponse {
    pub schedules: Vec<ScheduleWithState>,
}

fn validate_fraction(value: Decimal, field: &str) -> Result<Decimal, AppError> {
    if value.is_negative() || value >= Decimal::one() {
        return Err(AppError::BadRequest(format!(
            "{} must be a fraction in [0, 1)",
            field
        )));
    }
    Ok(value)
}

fn to_new_schedule(body: &ScheduleBody) -> Result<NewCommissionSchedule, AppError> {
    let (store_id, marketplace) = parse_scope(&body.store_id, &body.marketplace)?;

    let campaign_name = body.campaign_name.trim();
    if campaign_name.is_empty() {
        return Err(AppError::BadRequest(
            "campaignName must not be empty".to_string(),
        ));
    }
    if body.valid_until <= body.valid_from {
        return Err(AppError::BadRequest(
            "validUntil must be after validFrom".to_string(),
        ));
    }

    Ok(NewCommissionSchedule {
        store_id,
        marketplace,
        product_id: body.product_id,
        normal_rate: validate_fraction(body.normal_rate.unwrap_or_default(), "normalRate")?,
        campaign_rate: validate_fraction(body.campaign_rate, "campaignRate")?,
        campaign_name: campaign_name.to_string(),
        valid_from: TimeMs::new(body.valid_from),
        valid_until: TimeMs::new(body.valid_until),
        seller_discount_share: validate_fraction(
            body.seller_discount_share.unwrap_or_default(),
            "sellerDiscountShare",
        )?,
        marketplace_discount_share: validate_fraction(
            body.marketplace_discount_share.unwrap_or_default(),
            "marketplaceDiscountShare",
        )?,
        is_active: body.is_active.unwrap_or(true),
    })
}

/// Every schedule in the scope, each with its lifecycle state as of now.
pub async fn list_schedules(
    Query(params): Query<SchedulesQuery>,
    State(state): State<AppState>,
) -> Result<Json<SchedulesResponse>, AppError> {
    let (store_id, marketplace) = parse_scope(&params.store_id, &params.marketplace)?;

    let now = TimeMs::now();
    let schedules = state
        .repo
        .list_schedules(&store_id, &marketplace)
        .await?
        .into_iter()
        .map(|schedule| ScheduleWithState {
            state: schedule.state_at(now),
            schedule,
        })
        .collect();

    Ok(Json(SchedulesResponse { schedules }))
}

pub async fn create_schedule(
    State(state): State<AppState>,
    Json(body): Json<ScheduleBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let schedule = to_new_schedule(&body)?;
    let id = state.repo.insert_schedule(&schedule).await?;
    Ok(Json(serde_json::json!({"id": id})))
}

pub async fn create_quick_schedule(
    State(state): State<AppState>,
    Json(body): Json<QuickScheduleBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (store_id, marketplace) = parse_scope(&body.store_id, &body.marketplace)?;
    if body.duration_hours <= 0 {
        return Err(AppError::BadRequest(
            "durationHours must be positive".to_string(),
        ));
    }

    let now = TimeMs::now();
    let schedule = NewCommissionSchedule {
        store_id,
        marketplace,
        product_id: body.product_id,
        normal_rate: validate_fraction(body.normal_rate.unwrap_or_default(), "normalRate")?,
        campaign_rate: validate_fraction(body.campaign_rate, "campaignRate")?,
        campaign_name: body
            .campaign_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("Hizli kampanya")
            .to_string(),
        valid_from: now,
        valid_until: TimeMs::new(
            now.as_ms()
                .saturating_add(body.duration_hours.saturating_mul(3_600_000)),
        ),
        seller_discount_share: Decimal::zero(),
        marketplace_discount_share: Decimal::zero(),
        is_active: true,
    };

    let id = state.repo.insert_schedule(&schedule).await?;
    Ok(Json(serde_json::json!({
        "id": id,
        "validFrom": schedule.valid_from.as_ms(),
        "validUntil": schedule.valid_until.as_ms(),
    })))
}

/// Soft deactivation: the row survives for history, but the kill-switch is
/// terminal. Recreating the campaign means a new row.
pub async fn deactivate_schedule(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let deactivated = state.repo.deactivate_schedule(id).await?;
    if !deactivated {
        return Err(AppError::NotFound(format!(
            "No active schedule with id {}",
            id
        )));
    }
    Ok(Json(serde_json::json!({"deactivated": true})))
}
