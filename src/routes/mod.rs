//! Router assembly: HTTP endpoints, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - catalog, submission and per-user dashboard endpoints under `/api/v1/...`
/// - CORS (allow any origin/method/headers) for the dashboard frontend
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/templates", get(http::http_list_templates))
        .route("/api/v1/templates/:template_id", get(http::http_get_template))
        .route("/api/v1/submissions", post(http::http_post_submission))
        .route("/api/v1/users/:user_id/progress", get(http::http_get_progress))
        .route("/api/v1/users/:user_id/activity", get(http::http_get_activity))
        .route("/api/v1/users/:user_id/dashboard", get(http::http_get_dashboard))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
