use crate::api::AppState;
use axum::{
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

pub async fn get_metrics(State(state): State<Arc<AppState>>) -> Response {
    state.prometheus_handle.as_ref().map_or_else(
        || (StatusCode::NOT_FOUND, "Metrics not enabled").into_response(),
        |handle| handle.render().into_response(),
    )
}

/// Request-id span, request counters and latency histogram for every route.
pub async fn track_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().to_string();
    let uri = req.uri().path().to_string();

    let matched_path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string());

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %uri,
    );

    async move {
        let response = next.run(req).await;

        let status = response.status().as_u16();
        let outcome = if status >= 500 {
            "error"
        } else if status >= 400 {
            "client_error"
        } else {
            "success"
        };

        // Matched route when known, to keep label cardinality bounded
        let metrics_path = matched_path.unwrap_or(uri);

        let labels = [
            ("method", method),
            ("path", metrics_path),
            ("status", status.to_string()),
        ];

        metrics::counter!("http_requests_total", &labels).increment(1);
        metrics::histogram!("http_request_duration_seconds", &labels)
            .record(start.elapsed().as_secs_f64());

        info!(
            event = "http_request_finished",
            duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            status_code = status,
            outcome = %outcome,
            "Request finished"
        );

        response
    }
    .instrument(span)
    .await
}
