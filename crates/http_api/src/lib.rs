mod errors;
mod handlers;
mod middleware;
mod state;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use errors::HttpError;
pub use state::HttpState;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub fn router(state: HttpState) -> Router<()> {
    let tenant = Router::new()
        .route("/track", post(handlers::track))
        .route("/projects/:project_id/endpoints", get(handlers::endpoints))
        .route(
            "/projects/:project_id/endpoints/status/:status",
            get(handlers::endpoints_by_status),
        )
        .route(
            "/projects/:project_id/endpoints/summary",
            get(handlers::endpoints_summary),
        )
        .route("/analysis/:project_id", get(handlers::analysis))
        .route(
            "/analysis/run-now/:project_id",
            post(handlers::analysis_run_now),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_api_key,
        ));

    let admin = Router::new()
        .route("/maintenance/run-now", post(handlers::maintenance_run_now))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_admin_token,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(tenant)
        .merge(admin)
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests;
