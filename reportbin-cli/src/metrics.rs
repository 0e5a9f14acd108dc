use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, HistogramVec,
    IntCounter, IntCounterVec,
};

lazy_static! {
    pub static ref REPORTS_WRITTEN: IntCounter = register_int_counter!(
        "reports_written_total",
        "Total number of reports stored"
    )
    .unwrap();
    pub static ref REPORTS_READ: IntCounterVec = register_int_counter_vec!(
        "reports_read_total",
        "Report lookups by outcome",
        &["outcome"]
    )
    .unwrap();
    pub static ref REPORT_FAILURES: IntCounterVec = register_int_counter_vec!(
        "report_failures_total",
        "Failed report operations by operation and error class",
        &["operation", "class"]
    )
    .unwrap();
    pub static ref OPERATION_DURATION: HistogramVec = register_histogram_vec!(
        "report_operation_duration_seconds",
        "Time spent in a report write or read, including the store round trip",
        &["operation"],
        vec![0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0]
    )
    .unwrap();
}

/// Force registration so every series shows up before the first request.
pub fn init() {
    lazy_static::initialize(&REPORTS_WRITTEN);
    lazy_static::initialize(&REPORTS_READ);
    lazy_static::initialize(&REPORT_FAILURES);
    lazy_static::initialize(&OPERATION_DURATION);
}

/// Render the default registry in the Prometheus text format.
pub fn render() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
    }

    String::from_utf8(buffer).unwrap_or_else(|_| String::from("Encoding error"))
}
