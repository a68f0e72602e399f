use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use uuid::Uuid;

use crate::core::runner::ImportRunner;
use crate::domain::model::ImportRequest;
use crate::domain::ports::JobStore;
use crate::utils::error::ImportError;

pub struct AppState {
    pub runner: Arc<ImportRunner>,
    pub jobs: Arc<dyn JobStore>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn error_body(status: StatusCode, message: String) -> Response {
    (status, Json(ErrorBody { error: message })).into_response()
}

// ─── Routes ──────────────────────────────────────────────────

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/import", post(submit_import))
        .route("/import/latest", get(latest_job))
        .route("/import/{id}", get(job_by_id))
        .route("/health", get(health))
}

// ─── Handlers ────────────────────────────────────────────────

async fn submit_import(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ImportRequest>,
) -> Response {
    match state.runner.submit(request).await {
        Ok(job) => (StatusCode::CREATED, Json(job)).into_response(),
        Err(e @ ImportError::Conflict) => error_body(StatusCode::CONFLICT, e.to_string()),
        Err(e @ ImportError::InvalidSource { .. }) => {
            error_body(StatusCode::BAD_REQUEST, e.to_string())
        }
        Err(e) => {
            tracing::error!("Import submission failed: {}", e);
            error_body(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Read-only job snapshot for polling clients. No side effects, safe at any
/// call rate.
async fn job_by_id(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    let Ok(id) = Uuid::parse_str(&id) else {
        return error_body(StatusCode::NOT_FOUND, format!("unknown job: {}", id));
    };

    match state.jobs.get(id).await {
        Ok(Some(job)) => Json(job).into_response(),
        Ok(None) => error_body(StatusCode::NOT_FOUND, format!("unknown job: {}", id)),
        Err(e) => {
            tracing::error!("Job lookup failed: {}", e);
            error_body(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Most recently created job, whatever its state. Lets a reconnecting client
/// re-attach to an in-flight import instead of resubmitting.
async fn latest_job(State(state): State<Arc<AppState>>) -> Response {
    match state.jobs.latest().await {
        Ok(Some(job)) => Json(job).into_response(),
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            tracing::error!("Latest-job lookup failed: {}", e);
            error_body(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn health() -> &'static str {
    "ok"
}
