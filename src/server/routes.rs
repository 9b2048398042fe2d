//! Route table for the dashboard.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/scan", post(handlers::trigger_scan))
        .route("/acknowledge/:id", post(handlers::acknowledge))
        .route("/override/:id", post(handlers::override_analysis))
        .route("/report", get(handlers::generate_report))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
