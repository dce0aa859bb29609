use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::{ApiResponse, AppState, HealthResponse};

/// `GET /api/health`
///
/// Liveness plus a database round trip. Answers 503 when the database is
/// unreachable.
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let database = state.store().ping().await.is_ok();

    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ApiResponse::success(HealthResponse {
            status: if database { "ok" } else { "degraded" },
            database,
            version: env!("CARGO_PKG_VERSION"),
            uptime: state.start_time.elapsed().as_secs(),
        })),
    )
        .into_response()
}
