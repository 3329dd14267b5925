//! Adaptive timing controller.
//!
//! # Responsibilities
//! - Keep recent success and failure samples
//! - Recommend the delay before the next attempt
//! - Signal when the caller should rotate to another resource
//!
//! # Design Decisions
//! - Cold start: uniform delay until enough successes are seen
//! - Learned: normal draw around the delays that preceded successes,
//!   clamped to a safe window
//! - Only the read windows are retained; lifetime totals are counters

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::VecDeque;
use std::time::Duration;

use crate::config::TimingConfig;
use crate::observability::metrics;
use crate::timing::distribution::{mean_std_dev, normal, uniform_secs};

/// Result of one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn from_success(success: bool) -> Self {
        if success {
            Outcome::Success
        } else {
            Outcome::Failure
        }
    }
}

/// Timing data of one attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingSample {
    pub outcome: Outcome,
    /// Pacing delay associated with this attempt.
    pub delay_used: Duration,
    pub attempt_latency: Duration,
}

impl TimingSample {
    pub fn success(delay_used: Duration, attempt_latency: Duration) -> Self {
        Self {
            outcome: Outcome::Success,
            delay_used,
            attempt_latency,
        }
    }

    pub fn failure(attempt_latency: Duration) -> Self {
        Self {
            outcome: Outcome::Failure,
            delay_used: Duration::ZERO,
            attempt_latency,
        }
    }
}

#[derive(Debug)]
pub struct AdaptiveTiming {
    config: TimingConfig,
    successes: VecDeque<TimingSample>,
    failures: VecDeque<TimingSample>,
    total_successes: u64,
    total_failures: u64,
    rng: StdRng,
}

impl AdaptiveTiming {
    pub fn new(config: TimingConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            successes: VecDeque::with_capacity(config.success_window),
            failures: VecDeque::with_capacity(config.rotation_window),
            total_successes: 0,
            total_failures: 0,
            rng,
            config,
        }
    }

    pub fn with_seed(mut config: TimingConfig, seed: u64) -> Self {
        config.seed = Some(seed);
        Self::new(config)
    }

    pub fn record_attempt(&mut self, sample: TimingSample) {
        match sample.outcome {
            Outcome::Success => {
                self.total_successes += 1;
                let capacity = self.success_capacity();
                push_bounded(&mut self.successes, sample, capacity);
            }
            Outcome::Failure => {
                self.total_failures += 1;
                push_bounded(&mut self.failures, sample, self.config.rotation_window);
            }
        }
    }

    pub fn total_successes(&self) -> u64 {
        self.total_successes
    }

    pub fn total_failures(&self) -> u64 {
        self.total_failures
    }

    /// Delay to wait before the next attempt.
    pub fn next_delay(&mut self) -> Duration {
        let config = &self.config;

        let delay = if self.total_successes < config.learning_min_samples as u64 {
            uniform_secs(&mut self.rng, config.cold_start_min_secs, config.cold_start_max_secs)
        } else {
            let delays: Vec<f64> = self
                .successes
                .iter()
                .rev()
                .take(config.success_window)
                .map(|s| s.delay_used.as_secs_f64())
                .collect();
            // Never empty here: total_successes >= learning_min_samples > 0.
            let (mean, std_dev) = mean_std_dev(&delays).unwrap_or((config.min_delay_secs, 0.0));
            let drawn = normal(&mut self.rng, mean, std_dev);
            Duration::from_secs_f64(drawn.clamp(config.min_delay_secs, config.max_delay_secs))
        };

        metrics::record_delay(delay);
        delay
    }

    /// Back-off used after a failed attempt.
    pub fn failure_backoff(&mut self) -> Duration {
        uniform_secs(
            &mut self.rng,
            self.config.failure_delay_min_secs,
            self.config.failure_delay_max_secs,
        )
    }

    /// True when the caller should move to a different resource.
    pub fn should_rotate(&self) -> bool {
        if self.total_successes < self.config.rotation_min_successes as u64 {
            return true;
        }
        let recent_successes = self.successes.len().min(self.config.rotation_window);
        let recent_failures = self.failures.len().min(self.config.rotation_window);
        let recent = recent_successes + recent_failures;
        if recent == 0 {
            return true;
        }

        let rate = recent_successes as f64 / recent as f64;
        rate < self.config.rotation_success_rate
    }

    /// Success rate over the rotation window, if any samples exist.
    pub fn recent_success_rate(&self) -> Option<f64> {
        let s = self.successes.len().min(self.config.rotation_window);
        let f = self.failures.len().min(self.config.rotation_window);
        (s + f > 0).then(|| s as f64 / (s + f) as f64)
    }

    fn success_capacity(&self) -> usize {
        self.config.success_window.max(self.config.rotation_window)
    }
}

fn push_bounded(history: &mut VecDeque<TimingSample>, sample: TimingSample, capacity: usize) {
    if history.len() == capacity {
        history.pop_front();
    }
    history.push_back(sample);
}
