use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::middleware::metrics_middleware;
use super::{handlers, jobs, ws};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Jobs
        .route("/download", post(jobs::submit_download))
        .route("/status/{job_id}", get(jobs::job_status))
        .route("/download/{job_id}/zip", get(jobs::download_archive))
        .route("/job/{job_id}", delete(jobs::delete_job));

    Router::new()
        .route("/", get(handlers::root))
        .route("/metrics", get(handlers::metrics))
        .route("/ws/{job_id}", get(ws::job_progress_ws))
        .nest("/api", api_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
