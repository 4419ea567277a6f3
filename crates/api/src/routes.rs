use axum::{
    routing::{get, post, put},
    Router,
};
use router_core::TaskRouterService;
use std::sync::Arc;

use crate::handlers::{
    health::health_check,
    metrics::get_metrics,
    strategy::change_strategy,
    tasks::{broadcast_task, submit_task},
    workers::{list_workers, scale_workers},
};

#[derive(Clone)]
pub struct AppState {
    pub router: Arc<dyn TaskRouterService>,
}

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/tasks", post(submit_task))
        .route("/api/tasks/broadcast", post(broadcast_task))
        .route("/api/workers", get(list_workers))
        .route("/api/workers/scale", post(scale_workers))
        .route("/api/metrics", get(get_metrics))
        .route("/api/strategy", put(change_strategy))
        .with_state(state)
}
