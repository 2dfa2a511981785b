pub mod analytics;
pub mod capture;
pub mod export;
pub mod health;
pub mod orders;
pub mod products;
pub mod schedules;
pub mod shipping;
pub mod simulate;

use crate::capture::CaptureSlot;
use crate::config::Config;
use crate::db::Repository;
use crate::domain::{Marketplace, StoreId};
use crate::error::AppError;
use crate::views::Refresher;
use axum::routing::{delete, get, post, put};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Config,
    pub refresher: Arc<Refresher>,
    pub capture: Arc<CaptureSlot>,
}

impl AppState {
    pub fn new(repo: Arc<Repository>, config: Config) -> Self {
        Self {
            refresher: Arc::new(Refresher::new(repo.clone())),
            capture: Arc::new(CaptureSlot::new()),
            repo,
            config,
        }
    }
}

/// Validate and normalize the `(storeId, marketplace)` scope every
/// endpoint is keyed by.
pub(crate) fn parse_scope(store_id: &str, marketplace: &str) -> Result<(StoreId, Marketplace), AppError> {
    let store_id = store_id.trim();
    if store_id.is_empty() {
        return Err(AppError::BadRequest("storeId must not be empty".to_string()));
    }
    let marketplace = Marketplace::new(marketplace);
    if marketplace.as_str().is_empty() {
        return Err(AppError::BadRequest(
            "marketplace must not be empty".to_string(),
        ));
    }
    Ok((StoreId::new(store_id.to_string()), marketplace))
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route(
            "/v1/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/v1/products/:id",
            put(products::update_product).delete(products::delete_product),
        )
        .route(
            "/v1/shipping-rates",
            get(shipping::list_tiers).post(shipping::create_tier),
        )
        .route("/v1/shipping-rates/reset", post(shipping::reset_tiers))
        .route(
            "/v1/shipping-rates/:id",
            put(shipping::update_tier).delete(shipping::delete_tier),
        )
        .route(
            "/v1/commission-schedules",
            get(schedules::list_schedules).post(schedules::create_schedule),
        )
        .route(
            "/v1/commission-schedules/quick",
            post(schedules::create_quick_schedule),
        )
        .route(
            "/v1/commission-schedules/:id",
            delete(schedules::deactivate_schedule),
        )
        .route("/v1/simulate", post(simulate::simulate_price))
        .route(
            "/v1/orders",
            get(orders::list_orders).post(orders::record_orders),
        )
        .route("/v1/analytics/summary", get(analytics::get_summary))
        .route("/v1/export/products.csv", get(export::export_products_csv))
        .route("/v1/capture", post(capture::push_capture))
        .route("/v1/capture/latest", get(capture::get_latest_capture))
        .layer(cors)
        .with_state(state)
}
