//! Background health sweep.
//!
//! # Responsibilities
//! - Periodically probe every resource in the pool
//! - Feed probe results into the health registry
//! - Recover the pool when nothing healthy is left
//!
//! # Design Decisions
//! - Results go through the reachability path: they move the failure
//!   streak and ban flag, never attempt counts or latency
//! - A reachable exit with an undecodable body still counts as reachable

use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time;

use crate::admission::{HttpProber, ProbeError, Prober};
use crate::config::HealthCheckConfig;
use crate::observability::metrics;
use crate::pool::{Resource, ResourcePool};

/// What one sweep did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub probed: usize,
    pub healthy_probes: usize,
    pub recovered: usize,
}

pub struct HealthSweep<P> {
    pool: Arc<ResourcePool>,
    prober: P,
    interval: Duration,
    timeout: Duration,
}

impl HealthSweep<HttpProber> {
    pub fn from_config(pool: Arc<ResourcePool>, config: &HealthCheckConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        Self::new(
            pool,
            HttpProber::new(config.targets.clone(), timeout),
            Duration::from_secs(config.interval_secs),
            timeout,
        )
    }
}

impl<P: Prober> HealthSweep<P> {
    pub fn new(pool: Arc<ResourcePool>, prober: P, interval: Duration, timeout: Duration) -> Self {
        Self {
            pool,
            prober,
            interval,
            timeout,
        }
    }

    /// Sweep on every tick until shutdown is signalled.
    ///
    /// The first sweep runs immediately.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            resources = self.pool.len(),
            "Health sweep starting"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep_once().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health sweep received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Probe every resource once and apply the results.
    pub async fn sweep_once(&self) -> SweepReport {
        let resources = self.pool.resources();
        let outcomes = join_all(resources.iter().map(|r| self.timed_probe(r))).await;

        let mut report = SweepReport {
            probed: resources.len(),
            ..SweepReport::default()
        };
        for (resource, result) in resources.iter().zip(outcomes) {
            let reachable = match result {
                Ok(()) | Err(ProbeError::Decode(_)) => true,
                Err(e) => {
                    tracing::debug!(resource = %resource, error = %e, "Health probe failed");
                    false
                }
            };
            if reachable {
                report.healthy_probes += 1;
            }
            if let Err(e) = self.pool.record_probe(resource, reachable) {
                tracing::error!(resource = %resource, error = %e, "Failed to apply probe result");
            }
        }

        report.recovered = self.pool.recover_if_exhausted();

        let summary = self.pool.summary();
        tracing::info!(
            probed = report.probed,
            reachable = report.healthy_probes,
            healthy = summary.healthy_resources,
            banned = summary.banned_resources,
            "Health sweep complete"
        );
        metrics::record_summary(&summary);
        report
    }

    async fn timed_probe(&self, resource: &Resource) -> Result<(), ProbeError> {
        match time::timeout(self.timeout, self.prober.probe(resource)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ProbeError::Timeout(self.timeout)),
        }
    }
}
