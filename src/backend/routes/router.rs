/**
 * Router Configuration
 *
 * Combines the route groups into the final router:
 *
 * 1. Workspace routes (workspaces, members, channels, messages, events)
 * 2. `GET /health`
 * 3. Fallback: 404 as a JSON error body
 *
 * Requests are traced with `tower_http::trace::TraceLayer`.
 */

use axum::http::StatusCode;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::backend::error::BackendError;
use crate::backend::routes::workspace_routes::configure_workspace_routes;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    configure_workspace_routes(Router::new())
        .route("/health", axum::routing::get(|| async { "ok" }))
        .fallback(|| async { BackendError::handler(StatusCode::NOT_FOUND, "Not found") })
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
