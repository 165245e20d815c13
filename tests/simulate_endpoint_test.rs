use axum::http::StatusCode;
use paperfolio::api::{self, AppState};
use paperfolio::config::Config;
use paperfolio::db::init_db;
use paperfolio::portfolio::PortfolioService;
use paperfolio::quotes::{MockQuoteSource, QuoteSource};
use paperfolio::Repository;
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

async fn setup_test_app() -> (axum::Router, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();

    let pool = init_db(&db_path).await.expect("init_db failed");
    let repo = Arc::new(Repository::new(pool));
    let quotes: Arc<dyn QuoteSource> = Arc::new(MockQuoteSource::new());

    let mut env = HashMap::new();
    env.insert("DATABASE_PATH".to_string(), db_path);
    let config = Config::from_env_map(env).unwrap();

    let service = Arc::new(PortfolioService::new(repo.clone(), quotes, config.clone()));
    let state = AppState::new(repo, config, service);

    (api::create_router(state), temp_dir)
}

async fn simulate(
    app: axum::Router,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/v1/simulate")
        .header("content-type", "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_simulate_profitable_fixed_commission() {
    let (app, _temp) = setup_test_app().await;

    let (status, body) = simulate(
        app,
        serde_json::json!({
            "purchasePrice": 100,
            "salePrice": 150,
            "quantity": 10,
            "commission": {"mode": "fixed", "value": 5},
            "taxRatePercent": 26
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalPurchaseCost"], serde_json::json!(1000.0));
    assert_eq!(body["totalSaleRevenue"], serde_json::json!(1500.0));
    assert_eq!(body["commissionAmount"], serde_json::json!(5.0));
    assert_eq!(body["grossProfitLoss"], serde_json::json!(495.0));
    assert_eq!(body["taxAmount"], serde_json::json!(128.7));
    assert_eq!(body["netProfitLoss"], serde_json::json!(366.3));
}

#[tokio::test]
async fn test_simulate_loss_pays_no_tax() {
    let (app, _temp) = setup_test_app().await;

    let (status, body) = simulate(
        app,
        serde_json::json!({
            "purchasePrice": 100,
            "salePrice": 80,
            "quantity": 5,
            "commission": {"mode": "fixed", "value": 5},
            "taxRatePercent": 26
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["grossProfitLoss"], serde_json::json!(-105.0));
    assert_eq!(body["taxAmount"], serde_json::json!(0.0));
    assert_eq!(body["netProfitLoss"], serde_json::json!(-105.0));
}

#[tokio::test]
async fn test_simulate_percentage_commission_uses_price_sum() {
    let (app, _temp) = setup_test_app().await;

    let (status, body) = simulate(
        app,
        serde_json::json!({
            "purchasePrice": 50,
            "salePrice": 60,
            "quantity": 2,
            "commission": {"mode": "percentage", "value": 10},
            "taxRatePercent": 0
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["commissionAmount"], serde_json::json!(11.0));
    assert_eq!(body["grossProfitLoss"], serde_json::json!(9.0));
    assert_eq!(body["netProfitLoss"], serde_json::json!(9.0));
}

#[tokio::test]
async fn test_simulate_defaults_to_server_terms() {
    let (app, _temp) = setup_test_app().await;

    // No commission/tax in the request: fixed 5 and 26% apply
    let (status, body) = simulate(
        app,
        serde_json::json!({
            "purchasePrice": 100,
            "salePrice": 150,
            "quantity": 10
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["commissionAmount"], serde_json::json!(5.0));
    assert_eq!(body["taxAmount"], serde_json::json!(128.7));
}

#[tokio::test]
async fn test_simulate_include_tax_false() {
    let (app, _temp) = setup_test_app().await;

    let (status, body) = simulate(
        app,
        serde_json::json!({
            "purchasePrice": 100,
            "salePrice": 150,
            "quantity": 10,
            "includeTax": false
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["taxAmount"], serde_json::json!(0.0));
    assert_eq!(body["netProfitLoss"], serde_json::json!(495.0));
}

#[tokio::test]
async fn test_simulate_zero_quantity_rejected() {
    let (app, _temp) = setup_test_app().await;

    let (status, body) = simulate(
        app,
        serde_json::json!({
            "purchasePrice": 100,
            "salePrice": 150,
            "quantity": 0
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("quantity"));
}

#[tokio::test]
async fn test_simulate_negative_price_rejected() {
    let (app, _temp) = setup_test_app().await;

    let (status, _) = simulate(
        app,
        serde_json::json!({
            "purchasePrice": -1,
            "salePrice": 150,
            "quantity": 10
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_simulate_is_idempotent() {
    let (app, _temp) = setup_test_app().await;
    let payload = serde_json::json!({
        "purchasePrice": 123.45,
        "salePrice": 150.01,
        "quantity": 7,
        "commission": {"mode": "percentage", "value": 2.5},
        "taxRatePercent": 26
    });

    let (_, first) = simulate(app.clone(), payload.clone()).await;
    let (_, second) = simulate(app, payload).await;
    assert_eq!(first, second);
}
