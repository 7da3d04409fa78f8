use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::Utc;

use crate::readiness::Readiness;
use crate::server::SharedState;
use crate::types::{HealthResponse, ReadyResponse};

/// GET /healthz
/// Liveness: answers as long as the process is serving requests.
pub async fn healthz(State(state): State<SharedState>) -> Json<HealthResponse> {
    let cache = state.cache.stats().await;
    let uptime_secs = (Utc::now() - state.started_at).num_seconds().max(0) as u64;

    Json(HealthResponse {
        status: "ok",
        uptime_secs,
        cache,
    })
}

/// GET /readyz
/// Readiness: probes the backend on every call.
pub async fn readyz(State(state): State<SharedState>) -> Response {
    let readiness = state.readiness.check(&state.backend).await;
    let status = match readiness {
        Readiness::Ready => StatusCode::OK,
        Readiness::NotReady => StatusCode::SERVICE_UNAVAILABLE,
    };

    (
        status,
        Json(ReadyResponse {
            status: readiness,
            backend: state.backend.base_url().to_string(),
        }),
    )
        .into_response()
}
