//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define pool metrics (selections, outcomes, health, pacing)
//! - Expose Prometheus-compatible metrics endpoint
//! - Track per-resource and aggregate metrics
//!
//! # Metrics
//! - `egress_pool_selections_total` (counter): selections by strategy
//! - `egress_pool_outcomes_total` (counter): attempt outcomes by result
//! - `egress_pool_attempt_latency_seconds` (histogram): attempt latency
//! - `egress_pool_resource_healthy` (gauge): 1=healthy, 0=unhealthy
//! - `egress_pool_resources` (gauge): resource counts by state
//! - `egress_pool_validations_total` (counter): admission results
//! - `egress_pool_recoveries_total` (counter): resources given back
//! - `egress_pool_next_delay_seconds` (histogram): recommended delays
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Labels for strategy, result, resource and state

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

use crate::pool::types::{PoolSummary, Resource};

/// Install the Prometheus recorder with an HTTP listener on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_metrics();
            tracing::info!(address = %addr, "Metrics exporter listening");
        }
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter");
        }
    }
}

fn describe_metrics() {
    describe_counter!("egress_pool_selections_total", "Resources selected, by strategy");
    describe_counter!("egress_pool_outcomes_total", "Attempt outcomes reported, by result");
    describe_histogram!("egress_pool_attempt_latency_seconds", "Latency of reported attempts");
    describe_gauge!("egress_pool_resource_healthy", "1 if the resource is healthy, 0 otherwise");
    describe_gauge!("egress_pool_resources", "Resource counts by state");
    describe_counter!("egress_pool_validations_total", "Admission validations, by result");
    describe_counter!("egress_pool_recoveries_total", "Resources given back by exhaustion recovery");
    describe_histogram!("egress_pool_next_delay_seconds", "Recommended inter-attempt delays");
}

pub fn record_selection(strategy: &'static str) {
    counter!("egress_pool_selections_total", "strategy" => strategy).increment(1);
}

pub fn record_outcome(success: bool, latency: Duration) {
    let result = if success { "success" } else { "failure" };
    counter!("egress_pool_outcomes_total", "result" => result).increment(1);
    histogram!("egress_pool_attempt_latency_seconds").record(latency.as_secs_f64());
}

pub fn record_resource_health(resource: &Resource, healthy: bool) {
    gauge!("egress_pool_resource_healthy", "resource" => resource.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}

pub fn record_summary(summary: &PoolSummary) {
    gauge!("egress_pool_resources", "state" => "total").set(summary.total_resources as f64);
    gauge!("egress_pool_resources", "state" => "healthy").set(summary.healthy_resources as f64);
    gauge!("egress_pool_resources", "state" => "banned").set(summary.banned_resources as f64);
}

pub fn record_validation(accepted: bool) {
    let result = if accepted { "accepted" } else { "rejected" };
    counter!("egress_pool_validations_total", "result" => result).increment(1);
}

pub fn record_recovery(recovered: usize) {
    counter!("egress_pool_recoveries_total").increment(recovered as u64);
}

pub fn record_delay(delay: Duration) {
    histogram!("egress_pool_next_delay_seconds").record(delay.as_secs_f64());
}
