//! Prometheus metrics for the subject engine.
//!
//! All metrics live in one process-wide [`PROMETHEUS_REGISTRY`] and are
//! exported in text format by the `/metrics` endpoint.
//!
//! # Example
//! ```no_run
//! use subject_engine::metrics::SUBJECT_REQUESTS_TOTAL;
//!
//! SUBJECT_REQUESTS_TOTAL
//!     .with_label_values(&["person", "found"])
//!     .inc();
//! ```

mod middleware;

pub use middleware::track_metrics;

use lazy_static::lazy_static;
use prometheus::{CounterVec, Gauge, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry};

const NAMESPACE: &str = "subject_engine";

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    // ============================================================================
    // HTTP Metrics
    // ============================================================================

    /// Total number of HTTP requests received
    ///
    /// Labels: method, path, status_code
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests")
            .namespace(NAMESPACE),
        &["method", "path", "status_code"]
    ).expect("Failed to create HTTP_REQUESTS_TOTAL metric");

    /// HTTP request duration in seconds
    ///
    /// Labels: method, path
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request duration in seconds"
        )
        .namespace(NAMESPACE)
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["method", "path"]
    ).expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric");

    /// Number of in-flight HTTP requests
    pub static ref HTTP_CONNECTIONS_ACTIVE: Gauge = Gauge::with_opts(
        Opts::new("http_connections_active", "Number of in-flight HTTP requests")
            .namespace(NAMESPACE)
    ).expect("Failed to create HTTP_CONNECTIONS_ACTIVE metric");

    // ============================================================================
    // Subject Metrics
    // ============================================================================

    /// Subject lookups by outcome
    ///
    /// Labels: subject_type, outcome (found, empty, unavailable, rejected)
    pub static ref SUBJECT_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("subject_requests_total", "Total number of subject lookups")
            .namespace(NAMESPACE),
        &["subject_type", "outcome"]
    ).expect("Failed to create SUBJECT_REQUESTS_TOTAL metric");

    /// Facet entries skipped because they could not be mapped
    ///
    /// Labels: facet
    pub static ref FACET_ENTRIES_DROPPED_TOTAL: CounterVec = CounterVec::new(
        Opts::new("facet_entries_dropped_total", "Facet entries skipped during mapping")
            .namespace(NAMESPACE),
        &["facet"]
    ).expect("Failed to create FACET_ENTRIES_DROPPED_TOTAL metric");

    // ============================================================================
    // Search Gateway Metrics
    // ============================================================================

    /// Search gateway call duration in seconds
    ///
    /// Labels: backend
    pub static ref SEARCH_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "search_duration_seconds",
            "Search gateway call duration in seconds"
        )
        .namespace(NAMESPACE)
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["backend"]
    ).expect("Failed to create SEARCH_DURATION_SECONDS metric");

    /// Failed search gateway calls
    ///
    /// Labels: backend, error_type
    pub static ref SEARCH_ERRORS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("search_errors_total", "Total number of failed search gateway calls")
            .namespace(NAMESPACE),
        &["backend", "error_type"]
    ).expect("Failed to create SEARCH_ERRORS_TOTAL metric");

    // ============================================================================
    // System Metrics
    // ============================================================================

    /// Application build info
    ///
    /// Labels: version
    pub static ref BUILD_INFO: GaugeVec = GaugeVec::new(
        Opts::new("build_info", "Application build information")
            .namespace(NAMESPACE),
        &["version"]
    ).expect("Failed to create BUILD_INFO metric");
}

/// Register all metrics with [`PROMETHEUS_REGISTRY`].
///
/// Call once at startup. A second call fails with `AlreadyReg`.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    PROMETHEUS_REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(HTTP_CONNECTIONS_ACTIVE.clone()))?;

    PROMETHEUS_REGISTRY.register(Box::new(SUBJECT_REQUESTS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(FACET_ENTRIES_DROPPED_TOTAL.clone()))?;

    PROMETHEUS_REGISTRY.register(Box::new(SEARCH_DURATION_SECONDS.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(SEARCH_ERRORS_TOTAL.clone()))?;

    PROMETHEUS_REGISTRY.register(Box::new(BUILD_INFO.clone()))?;

    BUILD_INFO
        .with_label_values(&[env!("CARGO_PKG_VERSION")])
        .set(1.0);

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

/// Generate Prometheus text format metrics
pub fn gather_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = PROMETHEUS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Failed to convert metrics to string: {}", e);
        String::from("# Error converting metrics\n")
    })
}
