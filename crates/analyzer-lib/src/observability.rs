//! Observability infrastructure for the analyzer
//!
//! Provides:
//! - Prometheus metrics (analyze requests, logs received, failures, latency)
//! - Structured JSON logging with tracing

use prometheus::{register_histogram, register_int_counter, Histogram, IntCounter};
use std::sync::OnceLock;
use tracing::{error, info};

/// Histogram buckets for analysis latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<AnalyzerMetricsInner> = OnceLock::new();

struct AnalyzerMetricsInner {
    analyze_requests: IntCounter,
    logs_received: IntCounter,
    analysis_failures: IntCounter,
    analysis_latency_seconds: Histogram,
}

impl AnalyzerMetricsInner {
    fn new() -> Self {
        Self {
            analyze_requests: register_int_counter!(
                "multiverse_analyzer_analyze_requests_total",
                "Total number of accepted analyze requests"
            )
            .expect("Failed to register analyze_requests_total"),

            logs_received: register_int_counter!(
                "multiverse_analyzer_logs_received_total",
                "Total number of log entries received for analysis"
            )
            .expect("Failed to register logs_received_total"),

            analysis_failures: register_int_counter!(
                "multiverse_analyzer_analysis_failures_total",
                "Total number of analyze requests that failed inside the engine"
            )
            .expect("Failed to register analysis_failures_total"),

            analysis_latency_seconds: register_histogram!(
                "multiverse_analyzer_analysis_latency_seconds",
                "Time spent inside the analysis engine",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register analysis_latency_seconds"),
        }
    }
}

/// Analyzer metrics for Prometheus exposition
///
/// A lightweight handle to the global metrics instance. Clones share the
/// same underlying metrics.
#[derive(Clone)]
pub struct AnalyzerMetrics {
    _private: (),
}

impl Default for AnalyzerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyzerMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(AnalyzerMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &AnalyzerMetricsInner {
        GLOBAL_METRICS.get_or_init(AnalyzerMetricsInner::new)
    }

    /// Record an accepted analyze request and the size of its batch
    pub fn record_request(&self, num_logs: usize) {
        self.inner().analyze_requests.inc();
        self.inner().logs_received.inc_by(num_logs as u64);
    }

    pub fn inc_analysis_failures(&self) {
        self.inner().analysis_failures.inc();
    }

    pub fn observe_analysis_latency(&self, duration_secs: f64) {
        self.inner().analysis_latency_seconds.observe(duration_secs);
    }

    /// Render every registered metric in the Prometheus text format
    pub fn render(&self) -> Result<String, prometheus::Error> {
        use prometheus::{Encoder, TextEncoder};

        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&prometheus::gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Structured logger for analyzer events
#[derive(Clone)]
pub struct StructuredLogger {
    service: String,
}

impl StructuredLogger {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn log_startup(&self, version: &str, addr: &str) {
        info!(
            event = "analyzer_started",
            service = %self.service,
            version = %version,
            addr = %addr,
            "Multiverse analyzer started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "analyzer_shutdown",
            service = %self.service,
            reason = %reason,
            "Multiverse analyzer shutting down"
        );
    }

    /// Log the start of an analysis run
    pub fn log_analysis(&self, num_logs: usize, analysis_type: &str, engine: &str) {
        info!(
            event = "analyzing_logs",
            service = %self.service,
            num_logs = num_logs,
            analysis_type = %analysis_type,
            engine = %engine,
            "Analyzing logs"
        );
    }

    pub fn log_analysis_failed(&self, error: &str) {
        error!(
            event = "analysis_failed",
            service = %self.service,
            error = %error,
            "Log analysis failed"
        );
    }
}
