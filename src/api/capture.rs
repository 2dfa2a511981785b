//! Endpoints for the browser-extension capture slot.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::api::{parse_scope, AppState};
use crate::capture::ProductCapture;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureBody {
    pub store_id: String,
    pub marketplace: String,
    /// Raw captured fields, stored as-is.
    pub payload: serde_json::Value,
}

/// POST /v1/capture
pub async fn push_capture(
    State(state): State<AppState>,
    Json(body): Json<CaptureBody>,
) -> Result<Json<ProductCapture>, AppError> {
    let (store_id, marketplace) = parse_scope(&body.store_id, &body.marketplace)?;
    let capture = state
        .capture
        .publish(store_id, marketplace, body.payload)
        .await;
    tracing::debug!(id = %capture.id, marketplace = %capture.marketplace.as_str(), "Capture stored");
    Ok(Json(capture))
}

/// GET /v1/capture/latest
pub async fn get_latest_capture(
    State(state): State<AppState>,
) -> Result<Json<ProductCapture>, AppError> {
    match state.capture.latest().await {
        Some(capture) => Ok(Json(capture)),
        None => Err(AppError::NotFound(
            "No capture has been pushed yet".to_string(),
        )),
    }
}
