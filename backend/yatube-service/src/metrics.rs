//! Prometheus metrics for yatube-service.
//!
//! Request collectors are fed by `middleware::MetricsMiddleware`; the
//! `/metrics` handler renders the default registry.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    /// Total HTTP requests by method and response status.
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "yatube_http_requests_total",
        "Total HTTP requests segmented by method and status",
        &["method", "status"]
    )
    .expect("failed to register yatube_http_requests_total");

    /// HTTP request latency by method.
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "yatube_http_request_duration_seconds",
        "HTTP request duration segmented by method",
        &["method"]
    )
    .expect("failed to register yatube_http_request_duration_seconds");
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
