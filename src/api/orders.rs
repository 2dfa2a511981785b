use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{parse_scope, AppState};
use crate::domain::{Decimal, Marketplace, OrderLine, StoreId, TimeMs};
use crate::engine::{calculate_profit, resolve_commission_rate, ProfitInput, ShippingRateTable};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersQuery {
    pub store_id: String,
    pub marketplace: Option<String>,
    pub from_ms: Option<i64>,
    pub to_ms: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordOrdersBody {
    pub store_id: String,
    pub marketplace: String,
    pub lines: Vec<OrderLineBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineBody {
    pub product_id: i64,
    pub order_ref: Option<String>,
    /// Units sold; defaults to 1.
    pub quantity: Option<i64>,
    /// Unit price the sale closed at; defaults to the product's current price.
    pub sale_price: Option<Decimal>,
    /// Sale timestamp; defaults to now.
    pub sold_ms: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordOrdersResponse {
    /// Lines newly recorded by this call.
    pub recorded: usize,
    /// Lines skipped because their key was already recorded.
    pub duplicates: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersResponse {
    pub orders: Vec<OrderLine>,
}

/// Record sales with their financials frozen at recording time.
///
/// Each line snapshots the commission rate, shipping share and net profit
/// that applied when it was recorded; later edits to schedules or rate
/// tables never touch it. Recording is idempotent per line key.
pub async fn record_orders(
    State(state): State<AppState>,
    Json(body): Json<RecordOrdersBody>,
) -> Result<Json<RecordOrdersResponse>, AppError> {
    let (store_id, marketplace) = parse_scope(&body.store_id, &body.marketplace)?;
    if body.lines.is_empty() {
        return Err(AppError::BadRequest("lines must not be empty".to_string()));
    }

    let tiers = state.repo.list_visible_tiers(&store_id, &marketplace).await?;
    let schedules = state.repo.list_schedules(&store_id, &marketplace).await?;
    let table = ShippingRateTable::from_rows(tiers);
    let now = TimeMs::now();

    let mut lines = Vec::with_capacity(body.lines.len());
    for line in &body.lines {
        let product = state
            .repo
            .get_product(line.product_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("No product with id {}", line.product_id))
            })?;
        if product.store_id != store_id || product.marketplace != marketplace {
            return Err(AppError::BadRequest(format!(
                "Product {} does not belong to this scope",
                line.product_id
            )));
        }

        let quantity = line.quantity.unwrap_or(1);
        if quantity <= 0 {
            return Err(AppError::BadRequest("quantity must be positive".to_string()));
        }
        let sale_price = line.sale_price.unwrap_or(product.sales_price);
        let sold_ms = line.sold_ms.map(TimeMs::new).unwrap_or(now);
        let order_ref = line
            .order_ref
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        // Resolve at the sale price, not the product's listed price: the
        // price-band axis moves with what the buyer actually paid.
        let shipping_share = if product.has_shipping_override() {
            product.shipping_cost
        } else {
            table.resolve(product.desi, sale_price)
        };
        let commission = resolve_commission_rate(
            product.id,
            &product.marketplace,
            &schedules,
            product.commission_rate,
            now,
        );
        let breakdown = calculate_profit(&ProfitInput {
            sales_price: sale_price,
            buy_price: product.buy_price,
            commission_rate: commission.rate,
            vat_rate: product.vat_rate,
            shipping_cost: shipping_share,
            extra_cost: product.extra_cost,
            ad_cost: product.ad_cost,
            packaging_cost: product.packaging_cost,
            packaging_vat_included: product.packaging_vat_included,
            return_rate: product.return_rate,
            service_fee: product.service_fee,
        });

        let line_key = OrderLine::compute_line_key(
            order_ref.as_deref(),
            &store_id,
            &marketplace,
            product.id,
            sold_ms,
            quantity,
            &sale_price,
        );

        lines.push(OrderLine {
            id: 0,
            line_key,
            store_id: store_id.clone(),
            marketplace: marketplace.clone(),
            product_id: product.id,
            order_ref,
            quantity,
            sale_price,
            commission_rate_at_sale: commission.rate,
            shipping_share,
            net_profit: breakdown.net_profit * Decimal::from(quantity),
            sold_ms,
            created_ms: now,
        });
    }

    let recorded = state.repo.insert_order_lines_batch(&lines).await?;
    Ok(Json(RecordOrdersResponse {
        recorded,
        duplicates: lines.len() - recorded,
    }))
}

pub async fn list_orders(
    Query(params): Query<OrdersQuery>,
    State(state): State<AppState>,
) -> Result<Json<OrdersResponse>, AppError> {
    let store_id = params.store_id.trim();
    if store_id.is_empty() {
        return Err(AppError::BadRequest("storeId must not be empty".to_string()));
    }
    let store_id = StoreId::new(store_id.to_string());
    let marketplace = params
        .marketplace
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Marketplace::new);

    let from_ms = TimeMs::new(params.from_ms.unwrap_or(0));
    let to_ms = TimeMs::new(params.to_ms.unwrap_or(i64::MAX));
    if from_ms > to_ms {
        return Err(AppError::BadRequest("fromMs must be <= toMs".to_string()));
    }

    let orders = state
        .repo
        .query_order_lines(&store_id, marketplace.as_ref(), from_ms, to_ms)
        .await?;

    Ok(Json(OrdersResponse { orders }))
}
