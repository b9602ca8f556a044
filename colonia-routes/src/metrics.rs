use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::IntoResponse;
use error_stack::{Report, ResultExt};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use tokio::time::Instant;

const REQUEST_DURATION_METRIC_NAME: &str = "http_requests_duration_seconds";
const REQUEST_SIZE_METRIC_NAME: &str = "http_request_size";
const REQUESTS_TOTAL_METRIC_NAME: &str = "http_requests_total";

const COMMUNITIES_CREATED_METRIC_NAME: &str = "num_communities_created";
const RESIDENCES_CREATED_METRIC_NAME: &str = "num_residences_created";
const RESIDENCES_CLAIMED_METRIC_NAME: &str = "num_residences_claimed";
const VISITS_REGISTERED_METRIC_NAME: &str = "num_visits_registered";
const SESSIONS_STARTED_METRIC_NAME: &str = "num_sessions_started";

#[derive(Debug, thiserror::Error)]
#[error("failed to set up the prometheus recorder")]
pub struct MetricsSetupError;

pub fn setup_recorder() -> Result<PrometheusHandle, Report<MetricsSetupError>> {
    const EXPONENTIAL_SECONDS: &[f64] = &[0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

    const REQ_RES_BUCKETS: &[f64] = &[128.0, 256.0, 512.0, 1024.0, 2048.0, 4096.0, 8192.0, 16384.0];

    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(REQUEST_DURATION_METRIC_NAME.to_string()),
            EXPONENTIAL_SECONDS,
        )
        .change_context(MetricsSetupError)?
        .set_buckets_for_metric(
            Matcher::Full(REQUEST_SIZE_METRIC_NAME.to_string()),
            REQ_RES_BUCKETS,
        )
        .change_context(MetricsSetupError)?
        .install_recorder()
        .change_context(MetricsSetupError)
}

pub async fn track_http(req: Request, next: Next) -> impl IntoResponse {
    let path = if let Some(matched_path) = req.extensions().get::<MatchedPath>() {
        matched_path.as_str().to_owned()
    } else {
        req.uri().path().to_owned()
    };

    if path.ends_with("metrics") {
        return next.run(req).await;
    }

    let method = req.method().clone();

    let req_size = req
        .headers()
        .get("Content-Length")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<usize>().ok());

    if let Some(req_size) = req_size {
        metrics::histogram!(REQUEST_SIZE_METRIC_NAME).record(req_size as f64);
    }

    let start = Instant::now();
    let response = next.run(req).await;

    let latency = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    let labels = [
        ("method", method.to_string()),
        ("path", path),
        ("status", status),
    ];

    metrics::counter!(REQUESTS_TOTAL_METRIC_NAME, &labels).increment(1);
    metrics::histogram!(REQUEST_DURATION_METRIC_NAME, &labels).record(latency);
    response
}

#[inline]
pub fn increment_communities_created() {
    metrics::counter!(COMMUNITIES_CREATED_METRIC_NAME).increment(1);
}

#[inline]
pub fn increment_residences_created_by(amt: usize) {
    match u64::try_from(amt) {
        Ok(amt) => metrics::counter!(RESIDENCES_CREATED_METRIC_NAME).increment(amt),
        Err(e) => tracing::error!("could not increment residences created metric: {e}"),
    }
}

#[inline]
pub fn increment_residences_claimed(kind: &'static str) {
    metrics::counter!(RESIDENCES_CLAIMED_METRIC_NAME, "kind" => kind).increment(1);
}

#[inline]
pub fn increment_visits_registered() {
    metrics::counter!(VISITS_REGISTERED_METRIC_NAME).increment(1);
}

#[inline]
pub fn increment_sessions_started() {
    metrics::counter!(SESSIONS_STARTED_METRIC_NAME).increment(1);
}
