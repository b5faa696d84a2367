//! Metrics module for pricing-service.
//! Provides Prometheus metrics for catalog operations and pricing math.

use once_cell::sync::Lazy;
use prometheus::{
    histogram_opts, opts, register_histogram_vec, register_int_counter, register_int_counter_vec,
    Encoder, HistogramVec, IntCounter, IntCounterVec, TextEncoder,
};
use std::sync::OnceLock;

/// Request handling duration histogram
pub static REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        histogram_opts!(
            "pricing_request_duration_seconds",
            "Request handling duration"
        ),
        &["operation"]
    )
    .expect("Failed to register REQUEST_DURATION")
});

/// Tier catalog operations counter
pub static TIER_OPERATIONS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Temporal rule operations counter
pub static RULE_OPERATIONS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Rule evaluation counter by mode (automatic/manual)
pub static RULE_EVALUATIONS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Fare calculation counter
pub static PRICING_CALCULATIONS_TOTAL: OnceLock<IntCounter> = OnceLock::new();

/// Simulation counter
pub static SIMULATIONS_TOTAL: OnceLock<IntCounter> = OnceLock::new();

/// Error counter for alerting
pub static ERRORS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize all metrics. Call once at startup.
pub fn init_metrics() {
    TIER_OPERATIONS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "pricing_tier_operations_total",
                "Total tier catalog operations by operation type"
            ),
            &["operation"]
        )
        .expect("Failed to register TIER_OPERATIONS_TOTAL")
    });

    RULE_OPERATIONS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "pricing_rule_operations_total",
                "Total temporal rule operations by operation type"
            ),
            &["operation"]
        )
        .expect("Failed to register RULE_OPERATIONS_TOTAL")
    });

    RULE_EVALUATIONS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "pricing_rule_evaluations_total",
                "Total temporal rule evaluations by mode"
            ),
            &["mode"]
        )
        .expect("Failed to register RULE_EVALUATIONS_TOTAL")
    });

    PRICING_CALCULATIONS_TOTAL.get_or_init(|| {
        register_int_counter!(opts!(
            "pricing_calculations_total",
            "Total fare calculations"
        ))
        .expect("Failed to register PRICING_CALCULATIONS_TOTAL")
    });

    SIMULATIONS_TOTAL.get_or_init(|| {
        register_int_counter!(opts!(
            "pricing_simulations_total",
            "Total end-to-end fare simulations"
        ))
        .expect("Failed to register SIMULATIONS_TOTAL")
    });

    ERRORS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!("pricing_errors_total", "Total errors by component"),
            &["component", "operation"]
        )
        .expect("Failed to register ERRORS_TOTAL")
    });
}

pub fn record_tier_operation(operation: &str) {
    if let Some(counter) = TIER_OPERATIONS_TOTAL.get() {
        counter.with_label_values(&[operation]).inc();
    }
}

pub fn record_rule_operation(operation: &str) {
    if let Some(counter) = RULE_OPERATIONS_TOTAL.get() {
        counter.with_label_values(&[operation]).inc();
    }
}

pub fn record_rule_evaluation(mode: &str) {
    if let Some(counter) = RULE_EVALUATIONS_TOTAL.get() {
        counter.with_label_values(&[mode]).inc();
    }
}

pub fn record_pricing_calculation() {
    if let Some(counter) = PRICING_CALCULATIONS_TOTAL.get() {
        counter.inc();
    }
}

pub fn record_simulation() {
    if let Some(counter) = SIMULATIONS_TOTAL.get() {
        counter.inc();
    }
}

pub fn record_error(component: &str, operation: &str) {
    if let Some(counter) = ERRORS_TOTAL.get() {
        counter.with_label_values(&[component, operation]).inc();
    }
}

/// Render all registered metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if encoder.encode(&metric_families, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
