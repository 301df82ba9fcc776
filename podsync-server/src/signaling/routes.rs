use crate::signaling::{SignalingService, ws_handler};
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;

/// HTTP surface: `/ws` for signaling and `/health` for probes.
pub fn router(service: SignalingService, cors_origin: HeaderValue) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_credentials(true);

    Router::new()
        .route("/health", get(health))
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(service)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "OK", "message": "PodSync Server Running" }))
}
