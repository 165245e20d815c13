pub mod auth;
pub mod health;
pub mod portfolio;
pub mod settings;
pub mod simulate;
pub mod trade;
pub mod transactions;

use crate::config::Config;
use crate::db::Repository;
use crate::portfolio::PortfolioService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Config,
    pub service: Arc<PortfolioService>,
}

impl AppState {
    pub fn new(repo: Arc<Repository>, config: Config, service: Arc<PortfolioService>) -> Self {
        Self {
            repo,
            config,
            service,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/portfolio", get(portfolio::get_portfolio))
        .route("/v1/portfolio/top", get(portfolio::get_top_performers))
        .route("/v1/buy", post(trade::post_buy))
        .route("/v1/sell", post(trade::post_sell))
        .route("/v1/simulate", post(simulate::post_simulate))
        .route("/v1/transactions", get(transactions::get_transactions))
        .route(
            "/v1/transactions/export",
            get(transactions::export_transactions),
        )
        .route(
            "/v1/settings/:user_id",
            get(settings::get_settings).put(settings::put_settings),
        )
        .route("/v1/login", post(auth::post_login))
        .layer(cors)
        .with_state(state)
}
