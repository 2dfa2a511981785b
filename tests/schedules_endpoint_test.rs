use axum::http::StatusCode;
use marjin::api::{self, AppState};
use marjin::config::Config;
use marjin::db::init_db;
use marjin::Repository;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

struct TestApp {
    app: axum::Router,
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

    let state = AppState::new(repo, config);
    TestApp {
        app: api::create_router(state),
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

fn schedule_body(valid_from: i64, valid_until: i64) -> serde_json::Value {
    serde_json::json!({
        "storeId": "store-1",
        "marketplace": "trendyol",
        "normalRate": 0.15,
        "campaignRate": 0.08,
        "campaignName": "Mega Haziran",
        "validFrom": valid_from,
        "validUntil": valid_until
    })
}

#[tokio::test]
async fn test_create_then_list_attaches_state() {
    let test_app = setup_test_app().await;

    let (status, body) = send_json(
        test_app.app.clone(),
        "POST",
        "/v1/commission-schedules",
        schedule_body(0, i64::MAX),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let created: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(created["id"].is_i64());

    let (status, body) = get(
        test_app.app,
        "/v1/commission-schedules?storeId=store-1&marketplace=trendyol",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let schedules = json["schedules"].as_array().unwrap();
    assert_eq!(schedules.len(), 1);
    assert_eq!(schedules[0]["campaignName"], serde_json::json!("Mega Haziran"));
    assert_eq!(schedules[0]["campaignRate"], serde_json::json!(0.08));
    assert_eq!(schedules[0]["state"], serde_json::json!("active"));
}

#[tokio::test]
async fn test_window_not_yet_open_is_upcoming() {
    let test_app = setup_test_app().await;

    send_json(
        test_app.app.clone(),
        "POST",
        "/v1/commission-schedules",
        schedule_body(i64::MAX - 1, i64::MAX),
    )
    .await;

    let (_status, body) = get(
        test_app.app,
        "/v1/commission-schedules?storeId=store-1&marketplace=trendyol",
    )
    .await;
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["schedules"][0]["state"], serde_json::json!("upcoming"));
}

#[tokio::test]
async fn test_active_campaign_changes_published_financials() {
    let test_app = setup_test_app().await;

    send_json(
        test_app.app.clone(),
        "POST",
        "/v1/products",
        serde_json::json!({
            "storeId": "store-1",
            "marketplace": "trendyol",
            "name": "Kulaklik",
            "buyPrice": 400,
            "salesPrice": 1000,
            "commissionRate": 0.15,
            "vatRate": 20,
            "desi": 2,
            "shippingCost": 50
        }),
    )
    .await;
    send_json(
        test_app.app.clone(),
        "POST",
        "/v1/commission-schedules",
        schedule_body(0, i64::MAX),
    )
    .await;

    let (_status, body) = get(
        test_app.app,
        "/v1/products?storeId=store-1&marketplace=trendyol",
    )
    .await;
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    let commission = &json["products"][0]["financials"]["commission"];
    assert_eq!(commission["isCampaignActive"], serde_json::json!(true));
    assert_eq!(commission["rate"], serde_json::json!(0.08));
    assert_eq!(commission["campaignName"], serde_json::json!("Mega Haziran"));

    // 1000 - 400 - 200 VAT - 80 commission - 50 shipping.
    let profit = &json["products"][0]["financials"]["profit"];
    assert_eq!(profit["netProfit"], serde_json::json!(270.0));
}

#[tokio::test]
async fn test_quick_create_runs_from_now() {
    let test_app = setup_test_app().await;

    let (status, body) = send_json(
        test_app.app.clone(),
        "POST",
        "/v1/commission-schedules/quick",
        serde_json::json!({
            "storeId": "store-1",
            "marketplace": "trendyol",
            "campaignRate": 0.1,
            "durationHours": 48
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let valid_from = json["validFrom"].as_i64().unwrap();
    let valid_until = json["validUntil"].as_i64().unwrap();
    assert_eq!(valid_until - valid_from, 48 * 3_600_000);

    let (_status, body) = get(
        test_app.app,
        "/v1/commission-schedules?storeId=store-1&marketplace=trendyol",
    )
    .await;
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        json["schedules"][0]["campaignName"],
        serde_json::json!("Hizli kampanya")
    );
    assert_eq!(json["schedules"][0]["state"], serde_json::json!("active"));
}

#[tokio::test]
async fn test_deactivate_is_terminal() {
    let test_app = setup_test_app().await;

    let (_status, body) = send_json(
        test_app.app.clone(),
        "POST",
        "/v1/commission-schedules",
        schedule_body(0, i64::MAX),
    )
    .await;
    let created: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let id = created["id"].as_i64().unwrap();

    let req = axum::http::Request::builder()
        .method("DELETE")
        .uri(format!("/v1/commission-schedules/{}", id))
        .body(axum::body::Body::empty())
        .unwrap();
    let resp = test_app.app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let (_status, body) = get(
        test_app.app.clone(),
        "/v1/commission-schedules?storeId=store-1&marketplace=trendyol",
    )
    .await;
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["schedules"][0]["state"], serde_json::json!("deactivated"));

    // A second deactivation has nothing left to deactivate.
    let req = axum::http::Request::builder()
        .method("DELETE")
        .uri(format!("/v1/commission-schedules/{}", id))
        .body(axum::body::Body::empty())
        .unwrap();
    let resp = test_app.app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rates_must_be_fractions() {
    let test_app = setup_test_app().await;

    let mut body = schedule_body(0, 1000);
    body["campaignRate"] = serde_json::json!(1.5);
    let (status, _body) = send_json(
        test_app.app.clone(),
        "POST",
        "/v1/commission-schedules",
        body,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut body = schedule_body(0, 1000);
    body["normalRate"] = serde_json::json!(-0.1);
    let (status, _body) = send_json(test_app.app, "POST", "/v1/commission-schedules", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_window_must_be_ordered() {
    let test_app = setup_test_app().await;

    let (status, _body) = send_json(
        test_app.app,
        "POST",
        "/v1/commission-schedules",
        schedule_body(5000, 5000),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_quick_requires_positive_duration() {
    let test_app = setup_test_app().await;

    let (status, _body) = send_json(
        test_app.app,
        "POST",
        "/v1/commission-schedules/quick",
        serde_json::json!({
            "storeId": "store-1",
            "marketplace": "trendyol",
            "campaignRate": 0.1,
            "durationHours": 0
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
