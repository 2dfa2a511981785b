//! Store-level analytics summary.

use axum::extract::{Query, State};
use axum::Json;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};

use crate::api::{parse_scope, AppState};
use crate::domain::{Decimal, Marketplace, ScheduleState, StoreId, TimeMs};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    pub store_id: String,
    #[serde(default)]
    pub marketplace: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub store_id: String,
    /// Display currency for every amount below. No conversion happens;
    /// amounts are whatever currency the products were entered in.
    pub currency: String,
    /// Marketplaces the summary spans, sorted.
    pub marketplaces: Vec<Marketplace>,
    pub product_count: usize,
    /// Sum of listed sales prices across the spanned products.
    pub revenue: Decimal,
    /// Sum of the published per-product net profits. The addends are the
    /// already-rounded values the product list serves, so this total always
    /// matches what a client would get by summing that list itself.
    pub total_net_profit: Decimal,
    /// `totalNetProfit / revenue * 100`, rounded to one decimal place once.
    pub margin: Decimal,
    pub active_campaign_count: usize,
    pub order_count: usize,
    /// Sum of recorded order-line net profits, full history.
    pub order_net_profit: Decimal,
}

struct MarketplaceSlice {
    product_count: usize,
    revenue: Decimal,
    total_net: Decimal,
    active_campaigns: usize,
    order_count: usize,
    order_net: Decimal,
}

async fn summarize_marketplace(
    state: &AppState,
    store_id: &StoreId,
    marketplace: &Marketplace,
    now: TimeMs,
) -> Result<MarketplaceSlice, AppError> {
    let view = state.refresher.ensure_fresh(store_id, marketplace, now).await?;

    let mut revenue = Decimal::zero();
    let mut total_net = Decimal::zero();
    for item in &view.items {
        revenue = revenue + item.financials.profit.sales_price;
        total_net = total_net + item.financials.profit.net_profit;
    }

    let schedules = state.repo.list_schedules(store_id, marketplace).await?;
    let active_campaigns = schedules
        .iter()
        .filter(|s| s.state_at(now) == ScheduleState::Active)
        .count();

    let lines = state
        .repo
        .query_order_lines(
            store_id,
            Some(marketplace),
            TimeMs::new(0),
            TimeMs::new(i64::MAX),
        )
        .await?;
    let order_net = lines
        .iter()
        .fold(Decimal::zero(), |acc, line| acc + line.net_profit);

    Ok(MarketplaceSlice {
        product_count: view.items.len(),
        revenue,
        total_net,
        active_campaigns,
        order_count: lines.len(),
        order_net,
    })
}

/// GET /v1/analytics/summary
///
/// With a `marketplace` the summary covers that one scope; without it the
/// store's marketplaces are summarized concurrently and merged.
pub async fn get_summary(
    State(state): State<AppState>,
    Query(params): Query<SummaryQuery>,
) -> Result<Json<SummaryResponse>, AppError> {
    let now = TimeMs::now();

    let (store_id, marketplaces) = match params.marketplace.as_deref() {
        Some(marketplace) => {
            let (store_id, marketplace) = parse_scope(&params.store_id, marketplace)?;
            (store_id, vec![marketplace])
        }
        None => {
            let trimmed = params.store_id.trim();
            if trimmed.is_empty() {
                return Err(AppError::BadRequest("storeId must not be empty".to_string()));
            }
            let store_id = StoreId::new(trimmed.to_string());
            let marketplaces = state.repo.list_store_marketplaces(&store_id).await?;
            (store_id, marketplaces)
        }
    };

    let slice_futures = marketplaces.iter().map(|marketplace| {
        let state = state.clone();
        let store_id = store_id.clone();
        let marketplace = marketplace.clone();
        async move { summarize_marketplace(&state, &store_id, &marketplace, now).await }
    });
    let slices: Vec<MarketplaceSlice> = try_join_all(slice_futures).await?;

    let mut summary = SummaryResponse {
        store_id: store_id.as_str().to_string(),
        currency: state.config.currency.clone(),
        marketplaces,
        product_count: 0,
        revenue: Decimal::zero(),
        total_net_profit: Decimal::zero(),
        margin: Decimal::zero(),
        active_campaign_count: 0,
        order_count: 0,
        order_net_profit: Decimal::zero(),
    };
    for slice in slices {
        summary.product_count += slice.product_count;
        summary.revenue = summary.revenue + slice.revenue;
        summary.total_net_profit = summary.total_net_profit + slice.total_net;
        summary.active_campaign_count += slice.active_campaigns;
        summary.order_count += slice.order_count;
        summary.order_net_profit = summary.order_net_profit + slice.order_net;
    }
    if summary.revenue.is_positive() {
        summary.margin = (summary.total_net_profit / summary.revenue * Decimal::hundred()).round1();
    }

    Ok(Json(summary))
}
