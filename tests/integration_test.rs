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

async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = axum::http::Request::builder()
        .method("GET")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn post(
    app: axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _temp) = setup_test_app().await;
    let (status, body) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_ready_endpoint() {
    let (app, _temp) = setup_test_app().await;
    let (status, body) = get(app, "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_empty_portfolio() {
    let (app, _temp) = setup_test_app().await;
    let (status, body) = get(app, "/v1/portfolio").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["positions"].as_array().unwrap().len(), 0);
    assert_eq!(body["totalMarketValue"], serde_json::json!(0.0));
}

#[tokio::test]
async fn test_buy_then_portfolio_lists_position() {
    let (app, _temp) = setup_test_app().await;

    let (status, body) = post(
        app.clone(),
        "/v1/buy",
        serde_json::json!({"symbol": "AAPL", "quantity": 10, "price": 100}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["symbol"], "AAPL");
    assert_eq!(body["quantity"], 10);

    let (status, body) = get(app, "/v1/portfolio").await;
    assert_eq!(status, StatusCode::OK);
    let positions = body["positions"].as_array().unwrap();
    assert_eq!(positions.len(), 1);
    assert_eq!(positions[0]["symbol"], "AAPL");
    assert_eq!(positions[0]["costBasis"], serde_json::json!(1000.0));
    // Mock quote for AAPL is 175.50
    assert_eq!(positions[0]["marketValue"], serde_json::json!(1755.0));
}

#[tokio::test]
async fn test_buy_sell_full_flow() {
    let (app, _temp) = setup_test_app().await;

    post(
        app.clone(),
        "/v1/buy",
        serde_json::json!({"symbol": "AAPL", "quantity": 10, "price": 100}),
    )
    .await;

    // Default terms: fixed 5 commission, 26% tax
    let (status, body) = post(
        app.clone(),
        "/v1/sell",
        serde_json::json!({"symbol": "AAPL", "quantity": 10, "salePrice": 150}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["remainingQuantity"], 0);
    assert_eq!(body["settlement"]["grossProfitLoss"], serde_json::json!(495.0));
    assert_eq!(body["settlement"]["taxAmount"], serde_json::json!(128.7));
    assert_eq!(body["settlement"]["netProfitLoss"], serde_json::json!(366.3));

    // Position is gone
    let (_, body) = get(app.clone(), "/v1/portfolio").await;
    assert_eq!(body["positions"].as_array().unwrap().len(), 0);

    // Both trades in the history
    let (status, body) = get(app, "/v1/transactions").await;
    assert_eq!(status, StatusCode::OK);
    let transactions = body["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 2);
    // Buy and sell can land in the same millisecond, so pick by side.
    let sale = transactions
        .iter()
        .find(|t| t["side"] == "sell")
        .unwrap();
    assert!(transactions.iter().any(|t| t["side"] == "buy"));
    assert_eq!(sale["netAmount"], serde_json::json!(1366.3));
}

#[tokio::test]
async fn test_oversell_returns_bad_request() {
    let (app, _temp) = setup_test_app().await;

    post(
        app.clone(),
        "/v1/buy",
        serde_json::json!({"symbol": "AAPL", "quantity": 10, "price": 100}),
    )
    .await;

    let (status, body) = post(
        app,
        "/v1/sell",
        serde_json::json!({"symbol": "AAPL", "quantity": 11, "salePrice": 150}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("quantity"));
}

#[tokio::test]
async fn test_sell_unknown_position_returns_not_found() {
    let (app, _temp) = setup_test_app().await;

    let (status, _) = post(
        app,
        "/v1/sell",
        serde_json::json!({"symbol": "AAPL", "quantity": 1, "salePrice": 150}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_buy_unknown_symbol_without_price_returns_not_found() {
    let (app, _temp) = setup_test_app().await;

    let (status, _) = post(
        app,
        "/v1/buy",
        serde_json::json!({"symbol": "ZZZZ", "quantity": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_top_performers_ranking() {
    let (app, _temp) = setup_test_app().await;

    // AAPL quoted at 175.50, MSFT at 410.20
    post(
        app.clone(),
        "/v1/buy",
        serde_json::json!({"symbol": "AAPL", "quantity": 10, "price": 100}),
    )
    .await;
    post(
        app.clone(),
        "/v1/buy",
        serde_json::json!({"symbol": "MSFT", "quantity": 10, "price": 400}),
    )
    .await;

    let (status, body) = get(app, "/v1/portfolio/top?limit=1").await;
    assert_eq!(status, StatusCode::OK);
    let positions = body["positions"].as_array().unwrap();
    assert_eq!(positions.len(), 1);
    // AAPL unrealized +755 beats MSFT +102
    assert_eq!(positions[0]["symbol"], "AAPL");
}
