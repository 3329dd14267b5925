//! Resource pool management.
//!
//! # Responsibilities
//! - Hold the ordered resource set, group index and health registry
//! - Run the configured selection strategy
//! - Accept outcome reports and admissions
//! - Provide read-only summaries

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

use crate::admission::ValidationResult;
use crate::config::{PoolConfig, ResourceConfig, StrategyKind};
use crate::health::registry::HealthRegistry;
use crate::health::state::{HealthPolicy, ResourceStats};
use crate::observability::metrics;
use crate::pool::groups::{GroupIndex, DEFAULT_GROUP};
use crate::pool::types::{PoolError, PoolResult, PoolSummary, Resource, ResourcePerformance};
use crate::selection::{build_strategy, SelectionContext, SelectionStrategy};

/// Extra draws tried to move off a resource the caller wants to avoid.
const MAX_ROTATION_REROLLS: usize = 5;

/// Shared pool of egress resources.
///
/// Meant to be wrapped in an `Arc` and handed to the driver loop and the
/// health sweep.
#[derive(Debug)]
pub struct ResourcePool {
    resources: RwLock<Vec<Resource>>,
    groups: RwLock<GroupIndex>,
    registry: HealthRegistry,
    strategy: Box<dyn SelectionStrategy>,
    /// Selection RNG; its lock also serializes selections.
    rng: Mutex<StdRng>,
}

impl ResourcePool {
    /// Build a pool from resource definitions.
    ///
    /// Duplicate addresses keep their first occurrence.
    pub fn new(
        resources: Vec<ResourceConfig>,
        policy: HealthPolicy,
        strategy: StrategyKind,
        seed: Option<u64>,
    ) -> PoolResult<Self> {
        let pool = Self {
            resources: RwLock::new(Vec::with_capacity(resources.len())),
            groups: RwLock::new(GroupIndex::new()),
            registry: HealthRegistry::new(policy),
            strategy: build_strategy(strategy),
            rng: Mutex::new(match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            }),
        };

        for config in resources {
            let resource = Resource::new(config.address.trim());
            let group = config.group.as_deref().unwrap_or(DEFAULT_GROUP);
            if !pool.admit(resource.clone(), group) {
                tracing::warn!(resource = %resource, "Duplicate resource ignored");
            }
        }

        if pool.len() == 0 {
            return Err(PoolError::EmptyPool);
        }

        tracing::info!(
            resources = pool.len(),
            strategy = pool.strategy.name(),
            "Resource pool created"
        );
        Ok(pool)
    }

    /// Build a pool from a loaded configuration.
    pub fn from_config(config: &PoolConfig) -> PoolResult<Self> {
        Self::new(
            config.resources.clone(),
            config.health.clone().into(),
            config.pool.strategy,
            config.pool.seed,
        )
    }

    /// Add a resource to the live pool. Returns false if it was already present.
    pub fn admit(&self, resource: Resource, group: &str) -> bool {
        if !self.registry.register(resource.clone()) {
            return false;
        }
        self.groups
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .assign(resource.clone(), group);
        self.resources
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(resource);
        true
    }

    /// Admit every accepted validation result, grouped by country code.
    ///
    /// Resources that are already members are moved to the reported group.
    pub fn admit_validated(&self, results: &[ValidationResult]) -> usize {
        let mut admitted = 0;
        for result in results.iter().filter(|r| r.accepted) {
            let group = result.group();
            if self.admit(result.resource.clone(), group) {
                admitted += 1;
            } else {
                self.groups
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .reassign(result.resource.clone(), group);
            }
        }
        admitted
    }

    /// Pick the next resource, optionally preferring a group.
    pub fn select_next(&self, preference: Option<&str>) -> PoolResult<Resource> {
        self.select(preference, None)
    }

    /// Pick the next resource, steering away from `avoid` when another
    /// candidate turns up within a few draws.
    ///
    /// Draws that land on `avoid` are discarded without being marked used.
    pub fn select_avoiding(&self, preference: Option<&str>, avoid: &Resource) -> PoolResult<Resource> {
        self.select(preference, Some(avoid))
    }

    fn select(&self, preference: Option<&str>, avoid: Option<&Resource>) -> PoolResult<Resource> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);

        let resources = self.resources();
        let groups = self.groups.read().unwrap_or_else(PoisonError::into_inner);
        let ctx = SelectionContext {
            resources: &resources,
            registry: &self.registry,
            preferred: preference.and_then(|g| groups.members(g)),
            now: Instant::now(),
        };

        let mut selected = self
            .strategy
            .next_resource(&ctx, &mut rng)
            .ok_or(PoolError::EmptyPool)?;
        if let Some(avoid) = avoid {
            let mut rerolls = 0;
            while selected == *avoid && rerolls < MAX_ROTATION_REROLLS && resources.len() > 1 {
                selected = self
                    .strategy
                    .next_resource(&ctx, &mut rng)
                    .ok_or(PoolError::EmptyPool)?;
                rerolls += 1;
            }
        }
        self.registry.mark_used(&selected, ctx.now);
        drop(groups);
        drop(rng);

        tracing::debug!(resource = %selected, strategy = self.strategy.name(), "Resource selected");
        metrics::record_selection(self.strategy.name());
        Ok(selected)
    }

    /// Report the outcome of an attempt made through `resource`.
    pub fn record_outcome(
        &self,
        resource: &Resource,
        success: bool,
        latency: Duration,
    ) -> PoolResult<ResourceStats> {
        self.registry.record_outcome(resource, success, latency)
    }

    /// Report a reachability check. Attempt counters are left alone.
    pub fn record_probe(&self, resource: &Resource, reachable: bool) -> PoolResult<ResourceStats> {
        self.registry.record_probe(resource, reachable)
    }

    pub fn is_healthy(&self, resource: &Resource) -> PoolResult<bool> {
        self.registry.is_healthy(resource)
    }

    pub fn stats(&self, resource: &Resource) -> PoolResult<ResourceStats> {
        self.registry.stats(resource)
    }

    /// Give back moderately failing resources if nothing is healthy.
    pub fn recover_if_exhausted(&self) -> usize {
        self.registry.recover_if_exhausted(&self.resources())
    }

    /// Snapshot of the resource set in admission order.
    pub fn resources(&self) -> Vec<Resource> {
        self.resources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.resources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn group_of(&self, resource: &Resource) -> Option<String> {
        self.groups
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .group_of(resource)
            .map(str::to_string)
    }

    pub fn group_labels(&self) -> Vec<String> {
        self.groups
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .labels()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Aggregate counts. Has no side effects on pool state.
    pub fn summary(&self) -> PoolSummary {
        let policy = self.registry.policy();
        let resources = self.resources();
        let stats: Vec<ResourceStats> = resources
            .iter()
            .filter_map(|r| self.registry.stats(r).ok())
            .collect();

        let average_success_rate = if stats.is_empty() {
            1.0
        } else {
            stats.iter().map(ResourceStats::success_rate).sum::<f64>() / stats.len() as f64
        };

        PoolSummary {
            total_resources: resources.len(),
            healthy_resources: stats.iter().filter(|s| s.is_healthy(policy)).count(),
            banned_resources: stats.iter().filter(|s| s.banned).count(),
            total_attempts: stats.iter().map(|s| s.total_attempts).sum(),
            average_success_rate,
        }
    }

    /// Detailed report for one resource.
    pub fn performance(&self, resource: &Resource) -> PoolResult<ResourcePerformance> {
        let stats = self.registry.stats(resource)?;
        Ok(ResourcePerformance {
            resource: resource.clone(),
            group: self.group_of(resource),
            total_attempts: stats.total_attempts,
            success_rate: stats.success_rate(),
            average_latency_secs: stats.average_latency.map(|d| d.as_secs_f64()),
            healthy: stats.is_healthy(self.registry.policy()),
            banned: stats.banned,
            consecutive_failures: stats.consecutive_failures,
        })
    }

}
