/**
 * Server Initialization
 *
 * Builds the application state from a `ServerConfig` and returns a router
 * ready to serve.
 *
 * # Initialization Process
 *
 * 1. Connect to PostgreSQL when `database_url` is set, running migrations
 * 2. Pick the store: `PgStore` over the pool, otherwise `InMemoryStore`
 * 3. Wire the services and the realtime channel into `AppState`
 * 4. Start the background tasks (lock cleanup, removal sweep)
 * 5. Create the router
 */

use axum::Router;
use std::sync::Arc;

use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, ServerConfig};
use crate::backend::server::state::AppState;
use crate::backend::store::{InMemoryStore, PgStore, SharedStore};

/// Create and configure the Axum application
///
/// A database that is configured but unreachable is not fatal: the server
/// logs the failure and continues on the in-memory store.
pub async fn create_app(config: &ServerConfig) -> Router<()> {
    tracing::info!("Initializing xfteam server");

    let db_pool = match config.database_url.as_deref() {
        Some(url) => load_database(url).await,
        None => {
            tracing::warn!("DATABASE_URL not set");
            None
        }
    };

    let store: SharedStore = match db_pool {
        Some(pool) => Arc::new(PgStore::new(pool)),
        None => {
            tracing::warn!("Using in-memory store - data will not survive a restart");
            Arc::new(InMemoryStore::new())
        }
    };

    let app_state = AppState::new(store, config.broadcast_capacity);
    spawn_background_tasks(&app_state, config);

    tracing::info!("Router configured with background tasks");
    create_router(app_state)
}

/// Start the periodic maintenance tasks
///
/// - idle workspace locks are dropped every `lock_cleanup_interval`
/// - removals interrupted by a failure or a restart are finished every
///   `sweep_interval`
pub fn spawn_background_tasks(app_state: &AppState, config: &ServerConfig) {
    let locks = app_state.locks.clone();
    let cleanup_every = config.lock_cleanup_interval();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(cleanup_every);
        loop {
            interval.tick().await;
            let removed = locks.cleanup_idle();
            tracing::debug!("[Workspaces] Cleaned up {} idle workspace locks", removed);
        }
    });

    let workspaces = app_state.workspaces.clone();
    let sweep_every = config.sweep_interval();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_every);
        loop {
            interval.tick().await;
            match workspaces.sweep_pending_removals().await {
                Ok(0) => {}
                Ok(finished) => {
                    tracing::info!("[Workspaces] Finished {} interrupted removals", finished)
                }
                Err(e) => tracing::error!("[Workspaces] Removal sweep failed: {}", e),
            }
        }
    });
}
