//! Router assembly and server startup.

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::store::{SharedTaskStore, TaskStore};
use crate::todoist::TodoistClient;

use super::tasks;

/// Shared application state.
pub struct AppState {
    pub store: SharedTaskStore,
}

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/tasks", get(tasks::list).post(tasks::create))
        .route("/api/tasks/refetch", post(tasks::refetch))
        .route("/api/tasks/:id", put(tasks::update).delete(tasks::remove))
        .route("/api/tasks/:id/close", post(tasks::close))
        .route("/api/tasks/:id/move", post(tasks::move_to_quadrant))
        .route("/api/matrix", get(tasks::matrix))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let client = TodoistClient::with_base_url(&config.todoist_api_url, &config.todoist_api_token)?;
    let store: SharedTaskStore = Arc::new(TaskStore::new(Arc::new(client)));

    // Warm the cache in the background; a failure stays visible in the
    // store state and the UI retries through the refetch endpoint.
    {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            if let Err(err) = store.refetch().await {
                tracing::warn!(error = %err, "initial task fetch failed");
            }
        });
    }

    let app = router(Arc::new(AppState { store }));

    let listener = tokio::net::TcpListener::bind(&config.addr).await?;
    tracing::info!(addr = %config.addr, "quadrantd listening");
    axum::serve(listener, app).await?;
    Ok(())
}
