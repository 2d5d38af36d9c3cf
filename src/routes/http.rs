// GET handlers

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};

use super::{AppState, NOT_FOUND_PATH, UI_PATH};
use crate::models::Status;

/// GET /composite/info: info of every discovered service that answered.
pub(super) async fn composite_info_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.aggregator.aggregate_info().await)
}

/// GET /composite/health: health of every discovered service, DOWN/UNKNOWN included.
pub(super) async fn composite_health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.aggregator.aggregate_health().await)
}

/// GET /health: liveness of this process.
pub(super) async fn health_handler() -> impl IntoResponse {
    Json(Status::Up.document())
}

/// GET /info: build metadata of this process.
pub(super) async fn info_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({ "build": state.build_info.as_ref() }))
}

pub(super) async fn ui_redirect() -> impl IntoResponse {
    found(UI_PATH)
}

pub(super) async fn not_found_redirect() -> impl IntoResponse {
    found(NOT_FOUND_PATH)
}

fn found(location: &'static str) -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, location)])
}
