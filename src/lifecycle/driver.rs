//! Work loop pacing attempts across the pool.
//!
//! # Responsibilities
//! - Pick a resource per unit of work, rotating when pacing asks for it
//! - Run the caller's session through it
//! - Report the outcome to the pool and the timing controller
//! - Wait the recommended delay, interruptibly
//!
//! # Design Decisions
//! - The loop owns its timing controller; the pool is shared
//! - A success is recorded with the delay chosen after it,
//!   so the controller learns which pacing kept succeeding
//! - No sleep after the final attempt

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{self, Instant};

use crate::pool::{PoolError, Resource, ResourcePool};
use crate::timing::{AdaptiveTiming, Outcome, TimingSample};

/// One unit of caller work performed through a resource.
pub trait Session: Send + Sync {
    /// `rotated` is true when the pacing controller asked for a fresh resource.
    fn perform(&self, resource: &Resource, rotated: bool) -> impl Future<Output = Outcome> + Send;
}

#[derive(Debug, Clone, Default)]
pub struct DriverConfig {
    /// Stop after this many successes.
    pub target_successes: Option<u64>,
    /// Stop after this many attempts.
    pub max_attempts: Option<u64>,
    /// Group to prefer when selecting.
    pub preference_group: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverReport {
    pub attempts: u64,
    pub successes: u64,
    pub failures: u64,
    /// Attempts that landed on a different resource than the previous one.
    pub rotations: u64,
    pub total_delay: Duration,
    /// True if shutdown cut the loop short.
    pub interrupted: bool,
}

pub struct Driver<S> {
    pool: Arc<ResourcePool>,
    timing: AdaptiveTiming,
    session: S,
    config: DriverConfig,
}

impl<S: Session> Driver<S> {
    pub fn new(pool: Arc<ResourcePool>, timing: AdaptiveTiming, session: S, config: DriverConfig) -> Self {
        Self {
            pool,
            timing,
            session,
            config,
        }
    }

    /// Run until a stop condition is met or shutdown is signalled.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) -> Result<DriverReport, PoolError> {
        let mut report = DriverReport::default();
        let mut previous: Option<Resource> = None;

        while !self.finished(&report) {
            let rotate = self.timing.should_rotate();
            let resource = self.choose(previous.as_ref(), rotate)?;
            if previous.as_ref().is_some_and(|p| *p != resource) {
                report.rotations += 1;
            }

            let started = Instant::now();
            let outcome = self.session.perform(&resource, rotate).await;
            let latency = started.elapsed();

            let success = outcome == Outcome::Success;
            self.pool.record_outcome(&resource, success, latency)?;
            report.attempts += 1;

            let delay = if success {
                report.successes += 1;
                let delay = self.timing.next_delay();
                self.timing.record_attempt(TimingSample::success(delay, latency));
                delay
            } else {
                report.failures += 1;
                self.timing.record_attempt(TimingSample::failure(latency));
                self.timing.failure_backoff()
            };

            if self.finished(&report) {
                break;
            }

            tracing::info!(
                resource = %resource,
                success,
                delay_secs = delay.as_secs_f64(),
                recent_success_rate = self.timing.recent_success_rate().unwrap_or(1.0),
                "Waiting before next attempt"
            );
            report.total_delay += delay;
            previous = Some(resource);

            tokio::select! {
                _ = time::sleep(delay) => {}
                _ = shutdown.recv() => {
                    tracing::info!("Driver received shutdown signal, exiting loop");
                    report.interrupted = true;
                    break;
                }
            }
        }

        tracing::info!(
            attempts = report.attempts,
            successes = report.successes,
            failures = report.failures,
            rotations = report.rotations,
            "Driver finished"
        );
        Ok(report)
    }

    fn finished(&self, report: &DriverReport) -> bool {
        self.config
            .target_successes
            .is_some_and(|target| report.successes >= target)
            || self
                .config
                .max_attempts
                .is_some_and(|max| report.attempts >= max)
    }

    fn choose(&self, previous: Option<&Resource>, rotate: bool) -> Result<Resource, PoolError> {
        let preference = self.config.preference_group.as_deref();
        match (rotate, previous) {
            (true, Some(previous)) => self.pool.select_avoiding(preference, previous),
            _ => self.pool.select_next(preference),
        }
    }
}
