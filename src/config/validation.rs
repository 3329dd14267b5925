//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (thresholds > 0, rates within [0, 1])
//! - Check threshold ordering and delay windows
//! - Detect duplicate resources
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: PoolConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::PoolConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("no resources configured")]
    NoResources,

    #[error("resource #{0} has an empty address")]
    BlankAddress(usize),

    #[error("resource '{0}' is listed more than once")]
    DuplicateResource(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{field} must be within [0, 1], got {value}")]
    RateOutOfRange { field: &'static str, value: f64 },

    #[error("thresholds must satisfy unhealthy ({unhealthy}) <= ban ({ban}) <= hard ({hard})")]
    ThresholdOrder { unhealthy: u64, ban: u64, hard: u64 },

    #[error("{field}: invalid window {min}..{max}")]
    InvertedWindow { field: &'static str, min: f64, max: f64 },

    #[error("{field}: invalid URL '{value}'")]
    InvalidUrl { field: &'static str, value: String },

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &PoolConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_resources(config, &mut errors);
    check_health(config, &mut errors);
    check_probes(config, &mut errors);
    check_timing(config, &mut errors);

    if config.observability.summary_interval_secs == 0 {
        errors.push(ValidationError::Zero("observability.summary_interval_secs"));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_resources(config: &PoolConfig, errors: &mut Vec<ValidationError>) {
    if config.resources.is_empty() {
        errors.push(ValidationError::NoResources);
        return;
    }

    let mut seen = HashSet::new();
    for (i, resource) in config.resources.iter().enumerate() {
        let address = resource.address.trim();
        if address.is_empty() {
            errors.push(ValidationError::BlankAddress(i));
        } else if !seen.insert(address) {
            errors.push(ValidationError::DuplicateResource(address.to_string()));
        }
    }
}

fn check_health(config: &PoolConfig, errors: &mut Vec<ValidationError>) {
    let health = &config.health;

    for (field, value) in [
        ("health.ban_threshold", health.ban_threshold),
        ("health.unhealthy_failure_threshold", health.unhealthy_failure_threshold),
        ("health.hard_failure_threshold", health.hard_failure_threshold),
    ] {
        if value == 0 {
            errors.push(ValidationError::Zero(field));
        }
    }

    if !(health.unhealthy_failure_threshold <= health.ban_threshold
        && health.ban_threshold <= health.hard_failure_threshold)
    {
        errors.push(ValidationError::ThresholdOrder {
            unhealthy: health.unhealthy_failure_threshold,
            ban: health.ban_threshold,
            hard: health.hard_failure_threshold,
        });
    }

    check_rate("health.min_success_rate", health.min_success_rate, errors);
}

fn check_probes(config: &PoolConfig, errors: &mut Vec<ValidationError>) {
    let sweep = &config.health_check;
    if sweep.interval_secs == 0 {
        errors.push(ValidationError::Zero("health_check.interval_secs"));
    }
    if sweep.timeout_secs == 0 {
        errors.push(ValidationError::Zero("health_check.timeout_secs"));
    }
    if sweep.enabled && sweep.targets.is_empty() {
        errors.push(ValidationError::Zero("health_check.targets"));
    }
    for target in &sweep.targets {
        if Url::parse(target).is_err() {
            errors.push(ValidationError::InvalidUrl {
                field: "health_check.targets",
                value: target.clone(),
            });
        }
    }

    let admission = &config.validation;
    if admission.timeout_secs == 0 {
        errors.push(ValidationError::Zero("validation.timeout_secs"));
    }
    if Url::parse(&admission.probe_url).is_err() {
        errors.push(ValidationError::InvalidUrl {
            field: "validation.probe_url",
            value: admission.probe_url.clone(),
        });
    }
}

fn check_timing(config: &PoolConfig, errors: &mut Vec<ValidationError>) {
    let timing = &config.timing;

    for (field, value) in [
        ("timing.learning_min_samples", timing.learning_min_samples),
        ("timing.success_window", timing.success_window),
        ("timing.rotation_window", timing.rotation_window),
    ] {
        if value == 0 {
            errors.push(ValidationError::Zero(field));
        }
    }

    for (field, min, max) in [
        ("timing.cold_start", timing.cold_start_min_secs, timing.cold_start_max_secs),
        ("timing.delay", timing.min_delay_secs, timing.max_delay_secs),
        ("timing.failure_delay", timing.failure_delay_min_secs, timing.failure_delay_max_secs),
    ] {
        if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max {
            errors.push(ValidationError::InvertedWindow { field, min, max });
        }
    }

    check_rate("timing.rotation_success_rate", timing.rotation_success_rate, errors);
}

fn check_rate(field: &'static str, value: f64, errors: &mut Vec<ValidationError>) {
    if !(0.0..=1.0).contains(&value) {
        errors.push(ValidationError::RateOutOfRange { field, value });
    }
}
