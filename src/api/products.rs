use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{parse_scope, AppState};
use crate::domain::{Decimal, NewProduct, TimeMs};
use crate::error::AppError;
use crate::views::ResolvedProduct;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeQuery {
    pub store_id: String,
    pub marketplace: String,
}

/// Create/replace payload. Absent or null numeric fields coerce to 0,
/// matching the calculator's "no such cost" rule. An absent VAT flag
/// means the packaging cost was entered VAT-inclusive.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductBody {
    pub store_id: String,
    pub marketplace: String,
    pub name: String,
    pub category: Option<String>,
    pub external_id: Option<String>,
    pub buy_price: Option<Decimal>,
    pub sales_price: Option<Decimal>,
    pub commission_rate: Option<Decimal>,
    pub vat_rate: Option<Decimal>,
    pub desi: Option<Decimal>,
    pub shipping_cost: Option<Decimal>,
    pub extra_cost: Option<Decimal>,
    pub ad_cost: Option<Decimal>,
    pub packaging_cost: Option<Decimal>,
    pub packaging_vat_included: Option<bool>,
    pub return_rate: Option<Decimal>,
    pub service_fee: Option<Decimal>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductsResponse {
    pub products: Vec<ResolvedProduct>,
    pub revision: i64,
    pub computed_at: i64,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}

fn to_new_product(body: &ProductBody) -> Result<NewProduct, AppError> {
    let (store_id, marketplace) = parse_scope(&body.store_id, &body.marketplace)?;
    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("name must not be empty".to_string()));
    }

    Ok(NewProduct {
        store_id,
        marketplace,
        name: name.to_string(),
        category: body.category.clone(),
        external_id: body.external_id.clone(),
        buy_price: body.buy_price.unwrap_or_default(),
        sales_price: body.sales_price.unwrap_or_default(),
        commission_rate: body.commission_rate.unwrap_or_default(),
        vat_rate: body.vat_rate.unwrap_or_default(),
        desi: body.desi.unwrap_or_default(),
        shipping_cost: body.shipping_cost.unwrap_or_default(),
        extra_cost: body.extra_cost.unwrap_or_default(),
        ad_cost: body.ad_cost.unwrap_or_default(),
        packaging_cost: body.packaging_cost.unwrap_or_default(),
        packaging_vat_included: body.packaging_vat_included.unwrap_or(true),
        return_rate: body.return_rate.unwrap_or_default(),
        service_fee: body.service_fee.unwrap_or_default(),
    })
}

/// Every product in the scope with its financials resolved as of now.
pub async fn list_products(
    Query(params): Query<ScopeQuery>,
    State(state): State<AppState>,
) -> Result<Json<ProductsResponse>, AppError> {
    let (store_id, marketplace) = parse_scope(&params.store_id, &params.marketplace)?;

    let view = state
        .refresher
        .ensure_fresh(&store_id, &marketplace, TimeMs::now())
        .await?;

    Ok(Json(ProductsResponse {
        products: view.items.clone(),
        revision: view.revision,
        computed_at: view.computed_at.as_ms(),
    }))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(body): Json<ProductBody>,
) -> Result<Json<CreatedResponse>, AppError> {
    let product = to_new_product(&body)?;
    let id = state.repo.insert_product(&product).await?;
    Ok(Json(CreatedResponse { id }))
}

pub async fn update_product(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(body): Json<ProductBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let product = to_new_product(&body)?;
    let updated = state.repo.update_product(id, &product).await?;
    if !updated {
        return Err(AppError::NotFound(format!("No product with id {}", id)));
    }
    Ok(Json(serde_json::json!({"updated": true})))
}

pub async fn delete_product(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let deleted = state.repo.delete_product(id).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("No product with id {}", id)));
    }
    Ok(Json(serde_json::json!({"deleted": true})))
}
