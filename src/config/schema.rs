//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the pool.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the egress pool.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PoolConfig {
    /// Resource definitions, in pool order.
    pub resources: Vec<ResourceConfig>,

    /// Selection settings.
    pub pool: SelectionConfig,

    /// Thresholds for the health predicate and ban logic.
    pub health: HealthPolicyConfig,

    /// Background health sweep settings.
    pub health_check: HealthCheckConfig,

    /// Admission probe settings.
    pub validation: ValidationConfig,

    /// Adaptive pacing settings.
    pub timing: TimingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// A single egress resource.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResourceConfig {
    /// Resource address (e.g., "203.0.113.7:8080" or "socks5://host:1080").
    pub address: String,

    /// Group label this resource belongs to (e.g., a region code).
    #[serde(default)]
    pub group: Option<String>,
}

impl ResourceConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            group: None,
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// Selection strategy identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    Intelligent,
    RoundRobin,
    Random,
    LeastUsed,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Intelligent => "intelligent",
            StrategyKind::RoundRobin => "round_robin",
            StrategyKind::Random => "random",
            StrategyKind::LeastUsed => "least_used",
        }
    }
}

/// Selection configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SelectionConfig {
    /// Strategy used by `select_next`.
    pub strategy: StrategyKind,

    /// Fixed seed for the selection RNG. Entropy-seeded when absent.
    pub seed: Option<u64>,
}

/// Health predicate thresholds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthPolicyConfig {
    /// Consecutive failures that ban a resource.
    pub ban_threshold: u64,

    /// Consecutive failures that make a resource unhealthy.
    pub unhealthy_failure_threshold: u64,

    /// Resources at or above this many consecutive failures are never recovered.
    pub hard_failure_threshold: u64,

    /// Attempts required before the success rate is taken into account.
    pub min_sample_size: u64,

    /// Minimum success rate once `min_sample_size` is exceeded.
    pub min_success_rate: f64,
}

impl Default for HealthPolicyConfig {
    fn default() -> Self {
        Self {
            ban_threshold: 5,
            unhealthy_failure_threshold: 3,
            hard_failure_threshold: 10,
            min_sample_size: 10,
            min_success_rate: 0.5,
        }
    }
}

/// Health sweep configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Enable the background sweep.
    pub enabled: bool,

    /// Sweep interval in seconds.
    pub interval_secs: u64,

    /// Per-probe timeout in seconds.
    pub timeout_secs: u64,

    /// Reachability targets; one is picked at random per probe.
    pub targets: Vec<String>,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 300,
            timeout_secs: 10,
            targets: vec![
                "http://httpbin.org/ip".to_string(),
                "https://api.ipify.org?format=json".to_string(),
            ],
        }
    }
}

/// Admission validation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Validate resources before building the pool.
    pub enabled: bool,

    /// Metadata endpoint reached through each resource.
    pub probe_url: String,

    /// Per-probe timeout in seconds.
    pub timeout_secs: u64,

    /// Provider substrings that mark hosting infrastructure.
    pub infrastructure_keywords: Vec<String>,

    /// Resource lists at or below this size skip validation.
    pub skip_below: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            probe_url: "https://ipapi.co/json/".to_string(),
            timeout_secs: 15,
            infrastructure_keywords: [
                "amazon",
                "google",
                "microsoft",
                "digitalocean",
                "ovh",
                "hetzner",
                "linode",
                "vultr",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            skip_below: 5,
        }
    }
}

/// Adaptive timing configuration. All durations are in seconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Successes required before the learned distribution is used.
    pub learning_min_samples: usize,

    /// Number of recent successes the distribution is learned from.
    pub success_window: usize,

    /// Cold-start delay window.
    pub cold_start_min_secs: f64,
    pub cold_start_max_secs: f64,

    /// Clamp applied to learned delays.
    pub min_delay_secs: f64,
    pub max_delay_secs: f64,

    /// Back-off window after a failed attempt.
    pub failure_delay_min_secs: f64,
    pub failure_delay_max_secs: f64,

    /// Recent samples per outcome considered by the rotation check.
    pub rotation_window: usize,

    /// Successes required before rotation is no longer forced.
    pub rotation_min_successes: usize,

    /// Rotate when the recent success rate falls below this.
    pub rotation_success_rate: f64,

    /// Fixed seed for the timing RNG. Entropy-seeded when absent.
    pub seed: Option<u64>,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            learning_min_samples: 10,
            success_window: 50,
            cold_start_min_secs: 120.0,
            cold_start_max_secs: 600.0,
            min_delay_secs: 60.0,
            max_delay_secs: 1800.0,
            failure_delay_min_secs: 180.0,
            failure_delay_max_secs: 420.0,
            rotation_window: 10,
            rotation_min_successes: 5,
            rotation_success_rate: 0.7,
            seed: None,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,

    /// Interval between summary log lines in monitor mode.
    pub summary_interval_secs: u64,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
            summary_interval_secs: 60,
        }
    }
}
