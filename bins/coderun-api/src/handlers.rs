// HTTP route handlers for the coderun API

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use coderun_common::types::{ExecutionResult, RunSummary, TestCase, TestCaseResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    pub code: String,
    pub language: String,
    #[serde(default)]
    pub input: String,
    /// Seconds
    #[serde(default)]
    pub time_limit: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct RunRequest {
    pub code: String,
    pub language: String,
    pub testcases: Vec<TestCase>,
    #[serde(default)]
    pub time_limit: Option<f64>,
    /// Megabytes; accepted for compatibility, not enforced
    #[serde(default)]
    pub memory_limit: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RunResponse {
    pub results: Vec<TestCaseResult>,
    pub summary: RunSummary,
}

/// GET /status - Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /runtimes - Runtime directory of the execution service
pub async fn list_runtimes(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.service.runtimes().await {
        Ok(runtimes) => (StatusCode::OK, Json(runtimes.to_vec())).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to fetch runtime directory");
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({
                    "error": format!("Failed to fetch runtimes: {}", e)
                })),
            )
                .into_response()
        }
    }
}

/// POST /execute - Run code once against a single input
pub async fn execute_code(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ExecuteRequest>,
) -> Json<ExecutionResult> {
    let result = state
        .service
        .execute_code(
            &payload.code,
            &payload.language,
            &payload.input,
            payload.time_limit,
        )
        .await;

    info!(
        language = %payload.language,
        execution_ms = result.execution_time_ms,
        has_error = result.error.is_some(),
        "Execution served"
    );

    Json(result)
}

/// POST /run - Judge code against a batch of test cases
pub async fn run_testcases(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RunRequest>,
) -> Json<RunResponse> {
    let results = state
        .service
        .run_testcases(
            &payload.code,
            &payload.language,
            &payload.testcases,
            payload.time_limit,
            payload.memory_limit,
        )
        .await;
    let summary = RunSummary::from_results(&results);

    info!(
        language = %payload.language,
        passed = summary.passed,
        total = summary.total,
        "Test run served"
    );

    Json(RunResponse { results, summary })
}
