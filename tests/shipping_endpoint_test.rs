use axum::http::StatusCode;
use marjin::api::{self, AppState};
use marjin::config::Config;
use marjin::db::init_db;
use marjin::db::seed::seed_default_rate_cards;
use marjin::Repository;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

struct TestApp {
    app: axum::Router,
    repo: Arc<Repository>,
    _temp: TempDir,
}

async fn setup_test_app() -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path).await.expect("init_db failed");
    let repo = Arc::new(Repository::new(pool));

    let config = Config {
        port: 0,
        database_path: db_path,
        seed_default_rates: false,
        currency: "TRY".to_string(),
    };

    let state = AppState::new(repo.clone(), config);
    TestApp {
        app: api::create_router(state),
        repo,
        _temp: temp_dir,
    }
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let req = axum::http::Request::builder()
        .method("GET")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();
    (status, body)
}

async fn send_json(
    app: axum::Router,
    method: &str,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, Vec<u8>) {
    let req = axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();
    (status, body)
}

fn desi_tier(min: f64, max: f64, cost: f64) -> serde_json::Value {
    serde_json::json!({
        "storeId": "store-1",
        "marketplace": "trendyol",
        "rateType": "desi",
        "minValue": min,
        "maxValue": max,
        "cost": cost
    })
}

#[tokio::test]
async fn test_custom_tiers_shadow_defaults_per_axis() {
    let test_app = setup_test_app().await;
    seed_default_rate_cards(&test_app.repo).await.unwrap();

    let uri = "/v1/shipping-rates?storeId=store-1&marketplace=trendyol";
    let (status, body) = get(test_app.app.clone(), uri).await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["tiers"].as_array().unwrap().len(), 13);

    let (status, _body) = send_json(
        test_app.app.clone(),
        "POST",
        "/v1/shipping-rates",
        desi_tier(0.0, 999999.0, 70.0),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_status, body) = get(test_app.app, uri).await;
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let tiers = json["tiers"].as_array().unwrap();

    let desi_rows: Vec<_> = tiers.iter().filter(|t| t["rateType"] == "desi").collect();
    let price_rows: Vec<_> = tiers.iter().filter(|t| t["rateType"] == "price").collect();

    assert_eq!(desi_rows.len(), 1, "custom row replaces the whole desi card");
    assert_eq!(desi_rows[0]["storeId"], serde_json::json!("store-1"));
    assert_eq!(desi_rows[0]["cost"], serde_json::json!(70.0));

    assert_eq!(price_rows.len(), 4, "untouched axis keeps its defaults");
    assert!(price_rows.iter().all(|t| t["storeId"].is_null()));
}

#[tokio::test]
async fn test_intersecting_band_rejected() {
    let test_app = setup_test_app().await;

    let (status, _body) = send_json(
        test_app.app.clone(),
        "POST",
        "/v1/shipping-rates",
        desi_tier(0.0, 10.0, 30.0),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(
        test_app.app.clone(),
        "POST",
        "/v1/shipping-rates",
        desi_tier(5.0, 20.0, 45.0),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("overlaps"));

    // Half-open bands make the shared endpoint legal.
    let (status, _body) = send_json(
        test_app.app,
        "POST",
        "/v1/shipping-rates",
        desi_tier(10.0, 20.0, 45.0),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_axes_do_not_overlap_each_other() {
    let test_app = setup_test_app().await;

    let (status, _body) = send_json(
        test_app.app.clone(),
        "POST",
        "/v1/shipping-rates",
        desi_tier(0.0, 10.0, 30.0),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Same numeric band on the price axis is a different partition.
    let (status, _body) = send_json(
        test_app.app,
        "POST",
        "/v1/shipping-rates",
        serde_json::json!({
            "storeId": "store-1",
            "marketplace": "trendyol",
            "rateType": "price",
            "minValue": 0.0,
            "maxValue": 10.0,
            "cost": 25.0
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_inactive_candidate_skips_overlap_check() {
    let test_app = setup_test_app().await;

    send_json(
        test_app.app.clone(),
        "POST",
        "/v1/shipping-rates",
        desi_tier(0.0, 10.0, 30.0),
    )
    .await;

    let mut inactive = desi_tier(0.0, 10.0, 35.0);
    inactive["isActive"] = serde_json::json!(false);
    let (status, _body) = send_json(test_app.app, "POST", "/v1/shipping-rates", inactive).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_update_excludes_own_row_from_overlap() {
    let test_app = setup_test_app().await;

    let (_status, body) = send_json(
        test_app.app.clone(),
        "POST",
        "/v1/shipping-rates",
        desi_tier(0.0, 10.0, 30.0),
    )
    .await;
    let created: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let id = created["id"].as_i64().unwrap();

    let (status, _body) = send_json(
        test_app.app,
        "PUT",
        &format!("/v1/shipping-rates/{}", id),
        desi_tier(0.0, 15.0, 32.0),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_bounds_validation() {
    let test_app = setup_test_app().await;

    let (status, _body) = send_json(
        test_app.app.clone(),
        "POST",
        "/v1/shipping-rates",
        desi_tier(-1.0, 10.0, 30.0),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _body) = send_json(
        test_app.app.clone(),
        "POST",
        "/v1/shipping-rates",
        desi_tier(10.0, 10.0, 30.0),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _body) = send_json(
        test_app.app,
        "POST",
        "/v1/shipping-rates",
        desi_tier(0.0, 10.0, -5.0),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reset_deletes_custom_rows() {
    let test_app = setup_test_app().await;

    send_json(
        test_app.app.clone(),
        "POST",
        "/v1/shipping-rates",
        desi_tier(0.0, 10.0, 30.0),
    )
    .await;
    send_json(
        test_app.app.clone(),
        "POST",
        "/v1/shipping-rates",
        desi_tier(10.0, 20.0, 45.0),
    )
    .await;

    let (status, body) = send_json(
        test_app.app.clone(),
        "POST",
        "/v1/shipping-rates/reset",
        serde_json::json!({"storeId": "store-1", "marketplace": "trendyol"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["deleted"], serde_json::json!(2));

    let (_status, body) = get(
        test_app.app,
        "/v1/shipping-rates?storeId=store-1&marketplace=trendyol",
    )
    .await;
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["tiers"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_delete_missing_tier_is_not_found() {
    let test_app = setup_test_app().await;

    let req = axum::http::Request::builder()
        .method("DELETE")
        .uri("/v1/shipping-rates/999")
        .body(axum::body::Body::empty())
        .unwrap();
    let resp = test_app.app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
