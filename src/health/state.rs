//! Per-resource statistics and the health predicate.
//!
//! # States
//! - Healthy: resource is eligible for selection
//! - Unhealthy: too many consecutive failures or a poor success rate
//! - Banned: consecutive failures reached the ban threshold
//!
//! # State Transitions
//! ```text
//! Healthy → Unhealthy: consecutive failures >= unhealthy threshold
//!                      or success rate < minimum after enough samples
//! Any     → Banned:    consecutive failures >= ban threshold
//! Banned  → Healthy:   only through pool recovery
//! ```
//!
//! # Design Decisions
//! - Counters only grow; `consecutive_failures` resets on success
//! - Success rate is 1.0 before the first attempt
//! - Average latency is an EWMA over successful attempts only
//! - Sweep results are reachability checks, not attempts: they keep their
//!   own failure streak and never touch the attempt counters

use std::time::{Duration, Instant};

use crate::config::HealthPolicyConfig;

/// Weight of a new latency sample in the moving average.
const LATENCY_EWMA_WEIGHT: f64 = 0.2;

/// Thresholds the health predicate is evaluated against.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthPolicy {
    pub ban_threshold: u64,
    pub unhealthy_failure_threshold: u64,
    pub hard_failure_threshold: u64,
    pub min_sample_size: u64,
    pub min_success_rate: f64,
}

impl Default for HealthPolicy {
    fn default() -> Self {
        HealthPolicyConfig::default().into()
    }
}

impl From<HealthPolicyConfig> for HealthPolicy {
    fn from(config: HealthPolicyConfig) -> Self {
        Self {
            ban_threshold: config.ban_threshold,
            unhealthy_failure_threshold: config.unhealthy_failure_threshold,
            hard_failure_threshold: config.hard_failure_threshold,
            min_sample_size: config.min_sample_size,
            min_success_rate: config.min_success_rate,
        }
    }
}

/// Live statistics for one resource.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResourceStats {
    pub total_attempts: u64,
    pub success_count: u64,
    pub failure_count: u64,
    pub consecutive_failures: u64,
    /// Failed reachability checks since the last success of either kind.
    pub probe_failures: u64,
    /// Time of the most recent selection.
    pub last_used_at: Option<Instant>,
    /// Moving average latency, seeded by the first sample.
    pub average_latency: Option<Duration>,
    pub banned: bool,
}

/// What an outcome did to a resource's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    Banned,
}

impl ResourceStats {
    /// Fraction of successful attempts; 1.0 with no attempts.
    pub fn success_rate(&self) -> f64 {
        if self.total_attempts == 0 {
            return 1.0;
        }
        self.success_count as f64 / self.total_attempts as f64
    }

    /// Longest current failure streak, from attempts or reachability checks.
    pub fn failure_streak(&self) -> u64 {
        self.consecutive_failures.max(self.probe_failures)
    }

    pub fn is_healthy(&self, policy: &HealthPolicy) -> bool {
        if self.banned || self.failure_streak() >= policy.unhealthy_failure_threshold {
            return false;
        }
        self.total_attempts <= policy.min_sample_size
            || self.success_rate() >= policy.min_success_rate
    }

    /// Apply one attempt outcome.
    pub fn record(&mut self, success: bool, latency: Duration, policy: &HealthPolicy) -> Transition {
        self.total_attempts += 1;

        if success {
            self.success_count += 1;
            self.consecutive_failures = 0;
            self.probe_failures = 0;
            self.average_latency = Some(match self.average_latency {
                None => latency,
                Some(avg) => avg.mul_f64(1.0 - LATENCY_EWMA_WEIGHT) + latency.mul_f64(LATENCY_EWMA_WEIGHT),
            });
            return Transition::Unchanged;
        }

        self.failure_count += 1;
        self.consecutive_failures += 1;

        if !self.banned && self.consecutive_failures >= policy.ban_threshold {
            self.banned = true;
            return Transition::Banned;
        }
        Transition::Unchanged
    }

    /// Apply one reachability check result.
    pub fn record_probe(&mut self, reachable: bool, policy: &HealthPolicy) -> Transition {
        if reachable {
            self.probe_failures = 0;
            self.consecutive_failures = 0;
            return Transition::Unchanged;
        }

        self.probe_failures += 1;
        if !self.banned && self.probe_failures >= policy.ban_threshold {
            self.banned = true;
            return Transition::Banned;
        }
        Transition::Unchanged
    }

    /// Clear failure state unless the resource failed catastrophically.
    /// Returns true if the resource was given back.
    pub fn recover(&mut self, policy: &HealthPolicy) -> bool {
        if self.failure_streak() >= policy.hard_failure_threshold {
            return false;
        }
        self.consecutive_failures = 0;
        self.probe_failures = 0;
        self.banned = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_fresh_stats_are_healthy() {
        let stats = ResourceStats::default();
        assert_eq!(stats.success_rate(), 1.0);
        assert!(stats.is_healthy(&HealthPolicy::default()));
    }

    #[test]
    fn test_counters_stay_consistent() {
        let policy = HealthPolicy::default();
        let mut stats = ResourceStats::default();
        for (i, success) in [true, false, false, true, false, true, true, false].iter().enumerate() {
            stats.record(*success, ms(100), &policy);
            assert_eq!(stats.total_attempts, (i + 1) as u64);
            assert_eq!(stats.total_attempts, stats.success_count + stats.failure_count);
            assert!(stats.consecutive_failures <= stats.total_attempts);
        }
    }

    #[test]
    fn test_ban_after_five_consecutive_failures() {
        let policy = HealthPolicy::default();
        let mut stats = ResourceStats::default();

        for _ in 0..4 {
            assert_eq!(stats.record(false, ms(10), &policy), Transition::Unchanged);
        }
        assert!(!stats.banned);
        // Unhealthy already at three.
        assert!(!stats.is_healthy(&policy));

        assert_eq!(stats.record(false, ms(10), &policy), Transition::Banned);
        assert!(stats.banned);
        // Stays banned without a second transition.
        assert_eq!(stats.record(false, ms(10), &policy), Transition::Unchanged);
    }

    #[test]
    fn test_success_resets_streak_but_not_ban() {
        let policy = HealthPolicy::default();
        let mut stats = ResourceStats::default();
        for _ in 0..5 {
            stats.record(false, ms(10), &policy);
        }
        stats.record(true, ms(10), &policy);

        assert_eq!(stats.consecutive_failures, 0);
        assert!(stats.banned);
        assert!(!stats.is_healthy(&policy));
    }

    #[test]
    fn test_interleaved_failures_never_ban() {
        let policy = HealthPolicy::default();
        let mut stats = ResourceStats::default();
        for _ in 0..10 {
            stats.record(false, ms(10), &policy);
            stats.record(false, ms(10), &policy);
            stats.record(true, ms(10), &policy);
        }
        assert!(!stats.banned);
    }

    #[test]
    fn test_low_success_rate_only_counts_after_min_samples() {
        let policy = HealthPolicy::default();
        let mut stats = ResourceStats::default();

        // 4 successes, 6 failures in alternating pairs: 10 attempts, rate 0.4
        for _ in 0..2 {
            stats.record(true, ms(10), &policy);
            stats.record(false, ms(10), &policy);
            stats.record(false, ms(10), &policy);
        }
        for _ in 0..2 {
            stats.record(true, ms(10), &policy);
            stats.record(false, ms(10), &policy);
        }
        assert_eq!(stats.total_attempts, 10);
        assert_eq!(stats.consecutive_failures, 1);
        assert!(stats.is_healthy(&policy));

        stats.record(false, ms(10), &policy);
        assert_eq!(stats.total_attempts, 11);
        assert!(stats.success_rate() < 0.5);
        assert!(!stats.is_healthy(&policy));
    }

    #[test]
    fn test_latency_ewma() {
        let policy = HealthPolicy::default();
        let mut stats = ResourceStats::default();

        stats.record(true, ms(1000), &policy);
        assert_eq!(stats.average_latency, Some(ms(1000)));

        stats.record(true, ms(2000), &policy);
        let avg = stats.average_latency.unwrap().as_secs_f64();
        assert!((avg - 1.2).abs() < 1e-6);

        // Failures do not move the average.
        stats.record(false, ms(9000), &policy);
        assert!((stats.average_latency.unwrap().as_secs_f64() - 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_check_results_leave_attempt_counters_alone() {
        let policy = HealthPolicy::default();
        let mut stats = ResourceStats::default();
        stats.record(true, ms(400), &policy);

        for _ in 0..12 {
            stats.record_probe(true, &policy);
        }
        assert_eq!(stats.total_attempts, 1);
        assert_eq!(stats.success_count, 1);
        assert_eq!(stats.average_latency, Some(ms(400)));
    }

    #[test]
    fn test_failed_checks_ban_without_counting_attempts() {
        let policy = HealthPolicy::default();
        let mut stats = ResourceStats::default();

        for _ in 0..3 {
            stats.record_probe(false, &policy);
        }
        assert!(!stats.is_healthy(&policy));
        assert_eq!(stats.total_attempts, 0);
        assert_eq!(stats.consecutive_failures, 0);

        stats.record_probe(false, &policy);
        assert_eq!(stats.record_probe(false, &policy), Transition::Banned);
        assert!(stats.banned);
        assert_eq!(stats.failure_streak(), 5);

        assert!(stats.recover(&policy));
        assert!(stats.is_healthy(&policy));
    }

    #[test]
    fn test_reachable_check_resets_attempt_streak() {
        let policy = HealthPolicy::default();
        let mut stats = ResourceStats::default();
        for _ in 0..3 {
            stats.record(false, ms(10), &policy);
        }
        stats.record_probe(true, &policy);
        assert_eq!(stats.consecutive_failures, 0);
        assert_eq!(stats.failure_count, 3);
        assert!(stats.is_healthy(&policy));
    }

    #[test]
    fn test_recover_respects_hard_threshold() {
        let policy = HealthPolicy::default();

        let mut moderate = ResourceStats::default();
        for _ in 0..7 {
            moderate.record(false, ms(10), &policy);
        }
        assert!(moderate.recover(&policy));
        assert!(!moderate.banned);
        assert_eq!(moderate.consecutive_failures, 0);

        let mut dead = ResourceStats::default();
        for _ in 0..10 {
            dead.record(false, ms(10), &policy);
        }
        assert!(!dead.recover(&policy));
        assert!(dead.banned);
        assert_eq!(dead.consecutive_failures, 10);
    }
}
