use lazy_static::lazy_static;
use prometheus::{register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec};

lazy_static! {
    // Outbound calls made through HttpClient
    pub static ref HTTP_CLIENT_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_client_requests_total",
        "Total requests issued by the HTTP client",
        &["method"]
    )
    .unwrap();

    pub static ref HTTP_CLIENT_ERRORS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_client_errors_total",
        "Total failed HTTP client calls",
        &["code"]  // code: 0 network, 408 timeout, otherwise HTTP status
    )
    .unwrap();

    pub static ref HTTP_CLIENT_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_client_request_duration_seconds",
        "HTTP client call duration in seconds",
        &["method"],
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    // Mock backend
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total HTTP requests served",
        &["method", "path", "status"]
    )
    .unwrap();

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();
}

/// Initialize all metrics (called on startup)
pub fn init_metrics() {
    // Force lazy_static initialization
    lazy_static::initialize(&HTTP_CLIENT_REQUESTS_TOTAL);
    lazy_static::initialize(&HTTP_CLIENT_ERRORS_TOTAL);
    lazy_static::initialize(&HTTP_CLIENT_REQUEST_DURATION_SECONDS);
    lazy_static::initialize(&HTTP_REQUESTS_TOTAL);
    lazy_static::initialize(&HTTP_REQUEST_DURATION_SECONDS);
}
