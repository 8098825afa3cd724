// Route table for the coderun API

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

use crate::handlers;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/status", get(handlers::health_check))
        .route("/runtimes", get(handlers::list_runtimes))
        .route("/execute", post(handlers::execute_code))
        .route("/run", post(handlers::run_testcases))
}
