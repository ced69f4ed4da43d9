use crate::error::MetricsSetupError;
use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::IntoResponse;
use error_stack::{Report, ResultExt};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use tokio::time::Instant;

const REQUESTS_TOTAL_METRIC_NAME: &str = "http_requests_total";
const REQUEST_DURATION_METRIC_NAME: &str = "http_requests_duration_seconds";
const REQUEST_SIZE_METRIC_NAME: &str = "http_request_size";

const RECORDS_CREATED_METRIC_NAME: &str = "kitchen_records_created";
const RECORDS_UPDATED_METRIC_NAME: &str = "kitchen_records_updated";
const RECORDS_DELETED_METRIC_NAME: &str = "kitchen_records_deleted";
const BARCODE_LOOKUPS_METRIC_NAME: &str = "kitchen_barcode_lookups";

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
pub fn increment_records_created(collection: &'static str) {
    metrics::counter!(RECORDS_CREATED_METRIC_NAME, "collection" => collection).increment(1);
}

#[inline]
pub fn increment_records_updated() {
    metrics::counter!(RECORDS_UPDATED_METRIC_NAME).increment(1);
}

#[inline]
pub fn increment_records_deleted() {
    metrics::counter!(RECORDS_DELETED_METRIC_NAME).increment(1);
}

#[inline]
pub fn increment_barcode_lookups(source: &'static str) {
    metrics::counter!(BARCODE_LOOKUPS_METRIC_NAME, "source" => source).increment(1);
}
