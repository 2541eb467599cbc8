//! Relay-specific metrics. Recorded through the global `metrics` recorder
//! installed by `relay_core::observability::init_metrics`.

use metrics::counter;

/// Count one relay invocation by outcome (`success`, `unauthorized`, ...).
pub fn record_relay_outcome(outcome: &'static str) {
    counter!("relay_requests_total", "outcome" => outcome).increment(1);
}
