//! CSV export of the per-product financial view.

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use serde::Deserialize;

use crate::api::{parse_scope, AppState};
use crate::domain::TimeMs;
use crate::error::AppError;
use crate::views::ResolvedProduct;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportQuery {
    pub store_id: String,
    pub marketplace: String,
}

/// Column order of the export. Headers match the JSON field names so a
/// spreadsheet row lines up with the product list response.
const HEADER: [&str; 21] = [
    "id",
    "name",
    "category",
    "externalId",
    "commissionRate",
    "isCampaignActive",
    "campaignName",
    "salesPrice",
    "buyPrice",
    "vat",
    "commission",
    "shippingCost",
    "extraCost",
    "adCost",
    "packagingCost",
    "returnCost",
    "serviceFee",
    "totalCost",
    "netProfit",
    "margin",
    "roi",
];

fn csv_record(item: &ResolvedProduct) -> [String; 21] {
    let product = &item.product;
    let commission = &item.financials.commission;
    let profit = &item.financials.profit;
    [
        product.id.to_string(),
        product.name.clone(),
        product.category.clone().unwrap_or_default(),
        product.external_id.clone().unwrap_or_default(),
        commission.rate.to_canonical_string(),
        commission.is_campaign_active.to_string(),
        commission.campaign_name.clone().unwrap_or_default(),
        profit.sales_price.to_canonical_string(),
        profit.buy_price.to_canonical_string(),
        profit.vat.to_canonical_string(),
        profit.commission.to_canonical_string(),
        profit.shipping_cost.to_canonical_string(),
        profit.extra_cost.to_canonical_string(),
        profit.ad_cost.to_canonical_string(),
        profit.packaging_cost.to_canonical_string(),
        profit.return_cost.to_canonical_string(),
        profit.service_fee.to_canonical_string(),
        profit.total_cost.to_canonical_string(),
        profit.net_profit.to_canonical_string(),
        profit.margin.to_canonical_string(),
        profit.roi.to_canonical_string(),
    ]
}

/// GET /v1/export/products.csv
///
/// Serves the same rounded values as the product list, formatted with the
/// crate's canonical decimal strings.
pub async fn export_products_csv(
    State(state): State<AppState>,
    Query(params): Query<ExportQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (store_id, marketplace) = parse_scope(&params.store_id, &params.marketplace)?;
    let view = state
        .refresher
        .ensure_fresh(&store_id, &marketplace, TimeMs::now())
        .await?;

    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    writer
        .write_record(HEADER)
        .map_err(|e| AppError::Internal(format!("CSV write failed: {}", e)))?;
    for item in &view.items {
        writer
            .write_record(csv_record(item))
            .map_err(|e| AppError::Internal(format!("CSV write failed: {}", e)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV write failed: {}", e)))?;
    let body = String::from_utf8(bytes)
        .map_err(|e| AppError::Internal(format!("CSV encoding failed: {}", e)))?;

    Ok(([(header::CONTENT_TYPE, "text/csv")], body))
}
