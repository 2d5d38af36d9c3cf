// HTTP routes: composite info/health, own liveness/build info, UI redirects

mod http;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::aggregator::Aggregator;
use crate::version::BuildInfo;

/// Where unmatched requests are sent; the UI itself is served elsewhere.
pub const UI_PATH: &str = "/ui/";
pub const NOT_FOUND_PATH: &str = "/ui/404.html";

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) aggregator: Arc<Aggregator>,
    pub(crate) build_info: Arc<BuildInfo>,
}

pub fn app(aggregator: Arc<Aggregator>) -> Router {
    let state = AppState {
        aggregator,
        build_info: Arc::new(BuildInfo::current()),
    };
    Router::new()
        .route("/", get(http::ui_redirect)) // GET /
        .route("/ui", get(http::ui_redirect)) // GET /ui
        .route("/health", get(http::health_handler)) // GET /health
        .route("/info", get(http::info_handler)) // GET /info
        .route("/composite/info", get(http::composite_info_handler)) // GET /composite/info
        .route("/composite/health", get(http::composite_health_handler)) // GET /composite/health
        .fallback(http::not_found_redirect)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
