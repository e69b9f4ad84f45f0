//! Route definitions for the DocVault HTTP API.
//!
//! All routes are mounted under `/api`. The router receives `AppState`
//! and passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    http::HeaderValue,
    routing::{delete, get, post},
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use docvault_core::config::app::CorsConfig;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(share_link_routes())
        .merge(shared_routes())
        .merge(log_routes())
        .merge(health_routes());

    let cors = build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Owner-facing share link management.
fn share_link_routes() -> Router<AppState> {
    Router::new()
        .route("/share-links", post(handlers::share::create_share_link))
        .route("/share-links", get(handlers::share::list_share_links))
        .route("/share-links/{id}", get(handlers::share::get_share_link))
        .route(
            "/share-links/{id}",
            delete(handlers::share::revoke_share_link),
        )
}

/// Public token access.
fn shared_routes() -> Router<AppState> {
    Router::new()
        .route("/shared/{token}", get(handlers::shared::validate_shared))
        .route(
            "/shared/{token}/validate",
            post(handlers::shared::validate_shared_with_password),
        )
        .route(
            "/shared/{token}/consume",
            post(handlers::shared::consume_shared),
        )
}

/// Access log queries.
fn log_routes() -> Router<AppState> {
    Router::new().route("/access-logs", get(handlers::logs::query_access_logs))
}

/// Health check endpoint (no auth required).
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Build CORS layer from configuration.
fn build_cors_layer(cors_config: &CorsConfig) -> CorsLayer {
    let mut cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if cors_config.allowed_origins.contains(&"*".to_string()) {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = cors_config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    cors.max_age(std::time::Duration::from_secs(cors_config.max_age_seconds))
}
