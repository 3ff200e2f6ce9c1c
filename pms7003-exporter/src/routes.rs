//! Axum route handlers for the exporter.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    error::ExporterError,
    state::{AppState, Reading},
};

// ── Router ────────────────────────────────────────────────────────────────────

/// Build the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(prometheus_metrics))
        .route("/v1/reading", get(latest_reading))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// `GET /health` — liveness check.
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({"status": "ok"})))
}

/// `GET /metrics` — Prometheus text exposition.
pub async fn prometheus_metrics(State(state): State<AppState>) -> impl IntoResponse {
    match &state.prometheus {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
            handle.render(),
        ),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            "Prometheus metrics not initialized".to_owned(),
        ),
    }
}

/// `GET /v1/reading` — most recent trusted reading as JSON.
///
/// # Errors
/// Returns [`ExporterError::NoReading`] until the first trusted frame arrives.
pub async fn latest_reading(
    State(state): State<AppState>,
) -> Result<Json<Reading>, ExporterError> {
    state.latest.get().map(Json).ok_or(ExporterError::NoReading)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use pms7003_core::Frame;
    use tower::ServiceExt;

    async fn get_path(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let req = match Request::builder().uri(uri).body(Body::empty()) {
            Ok(r) => r,
            Err(e) => panic!("failed to build request: {e}"),
        };
        let resp = match app.oneshot(req).await {
            Ok(r) => r,
            Err(e) => panic!("handler error: {e}"),
        };
        let status = resp.status();
        let bytes = match axum::body::to_bytes(resp.into_body(), 64 * 1024).await {
            Ok(b) => b,
            Err(e) => panic!("failed to read body: {e}"),
        };
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn health_response_format_returns_ok_with_status_field() {
        let (status, bytes) = get_path(create_router(AppState::default()), "/health").await;
        assert_eq!(status, StatusCode::OK);
        let body: serde_json::Value = match serde_json::from_slice(&bytes) {
            Ok(v) => v,
            Err(e) => panic!("invalid JSON: {e}"),
        };
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn reading_before_first_frame_is_unavailable() {
        let (status, bytes) = get_path(create_router(AppState::default()), "/v1/reading").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        let body: serde_json::Value = match serde_json::from_slice(&bytes) {
            Ok(v) => v,
            Err(e) => panic!("invalid JSON: {e}"),
        };
        assert_eq!(body["error"], "no reading available yet");
    }

    #[tokio::test]
    async fn reading_returns_latest_frame_with_aqi() {
        let state = AppState::default();
        state.latest.update(Frame { pm2_5_cf1: 37, pm10_cf1: 40, ..Frame::default() }.sealed());

        let (status, bytes) = get_path(create_router(state), "/v1/reading").await;
        assert_eq!(status, StatusCode::OK);
        let body: serde_json::Value = match serde_json::from_slice(&bytes) {
            Ok(v) => v,
            Err(e) => panic!("invalid JSON: {e}"),
        };
        assert_eq!(body["frame"]["pm2_5_cf1"], 37);
        assert_eq!(body["category"], "unhealthy_for_sensitive_groups");
        assert!(body["aqi_pm2_5"].as_f64().is_some_and(|v| v > 100.0), "aqi missing: {body}");
        assert!(body["received_at"].is_string(), "timestamp missing: {body}");
    }

    #[tokio::test]
    async fn metrics_without_recorder_is_unavailable() {
        let (status, _) = get_path(create_router(AppState::default()), "/metrics").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn metrics_renders_recorded_gauges() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let frame = Frame { pm2_5_atmo: 9, ..Frame::default() }.sealed();
        metrics::with_local_recorder(&recorder, || crate::metrics::record_frame(&frame));

        let state = AppState::default().with_prometheus_handle(handle);
        let (status, bytes) = get_path(create_router(state), "/metrics").await;
        assert_eq!(status, StatusCode::OK);
        let text = String::from_utf8_lossy(&bytes);
        assert!(
            text.contains("particle_concentration_environment{particle_size=\"2.5\"} 9"),
            "missing gauge in:\n{text}"
        );
    }
}
