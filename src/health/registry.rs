//! Resource health registry.
//!
//! # Responsibilities
//! - Own one statistics cell per admitted resource
//! - Apply attempt outcomes and ban resources past the threshold
//! - Evaluate the health predicate
//! - Give moderately failing resources back when the pool is exhausted
//!
//! # Design Decisions
//! - `DashMap` cells: updates for one resource are serialized, updates for
//!   different resources proceed in parallel
//! - Reads used for scoring are copies and may be slightly stale

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::time::{Duration, Instant};

use crate::health::state::{HealthPolicy, ResourceStats, Transition};
use crate::observability::metrics;
use crate::pool::types::{PoolError, PoolResult, Resource};

#[derive(Debug, Default)]
pub struct HealthRegistry {
    policy: HealthPolicy,
    cells: DashMap<Resource, ResourceStats>,
}

impl HealthRegistry {
    pub fn new(policy: HealthPolicy) -> Self {
        Self {
            policy,
            cells: DashMap::new(),
        }
    }

    pub fn policy(&self) -> &HealthPolicy {
        &self.policy
    }

    /// Allocate a statistics cell. Returns false if the resource is known.
    pub fn register(&self, resource: Resource) -> bool {
        match self.cells.entry(resource) {
            Entry::Vacant(cell) => {
                cell.insert(ResourceStats::default());
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn contains(&self, resource: &Resource) -> bool {
        self.cells.contains_key(resource)
    }

    /// Record the outcome of one attempt made through `resource`.
    pub fn record_outcome(
        &self,
        resource: &Resource,
        success: bool,
        latency: Duration,
    ) -> PoolResult<ResourceStats> {
        let mut cell = self
            .cells
            .get_mut(resource)
            .ok_or_else(|| PoolError::UnknownResource(resource.clone()))?;

        if cell.record(success, latency, &self.policy) == Transition::Banned {
            tracing::warn!(
                resource = %resource,
                consecutive_failures = cell.consecutive_failures,
                "Resource banned after consecutive failures"
            );
        }

        let stats = *cell;
        drop(cell);

        metrics::record_outcome(success, latency);
        metrics::record_resource_health(resource, stats.is_healthy(&self.policy));
        Ok(stats)
    }

    /// Record a background reachability check. Attempt counters and the
    /// latency average are left untouched.
    pub fn record_probe(&self, resource: &Resource, reachable: bool) -> PoolResult<ResourceStats> {
        let mut cell = self
            .cells
            .get_mut(resource)
            .ok_or_else(|| PoolError::UnknownResource(resource.clone()))?;

        if cell.record_probe(reachable, &self.policy) == Transition::Banned {
            tracing::warn!(
                resource = %resource,
                probe_failures = cell.probe_failures,
                "Resource banned after failed health checks"
            );
        }

        let stats = *cell;
        drop(cell);

        metrics::record_resource_health(resource, stats.is_healthy(&self.policy));
        Ok(stats)
    }

    pub fn is_healthy(&self, resource: &Resource) -> PoolResult<bool> {
        self.stats(resource).map(|s| s.is_healthy(&self.policy))
    }

    /// Copy of the current statistics for `resource`.
    pub fn stats(&self, resource: &Resource) -> PoolResult<ResourceStats> {
        self.cells
            .get(resource)
            .map(|cell| *cell)
            .ok_or_else(|| PoolError::UnknownResource(resource.clone()))
    }

    /// Stamp the selection time of `resource`.
    pub fn mark_used(&self, resource: &Resource, at: Instant) {
        if let Some(mut cell) = self.cells.get_mut(resource) {
            cell.last_used_at = Some(at);
        }
    }

    /// If none of `resources` is healthy, clear failure state on every one
    /// below the hard failure threshold. Returns how many were given back.
    pub fn recover_if_exhausted(&self, resources: &[Resource]) -> usize {
        let any_healthy = resources
            .iter()
            .any(|r| self.is_healthy(r).unwrap_or(false));
        if any_healthy || resources.is_empty() {
            return 0;
        }

        let mut recovered = 0;
        for resource in resources {
            if let Some(mut cell) = self.cells.get_mut(resource) {
                if cell.recover(&self.policy) {
                    recovered += 1;
                }
            }
        }

        tracing::warn!(
            recovered,
            total = resources.len(),
            "No healthy resources left, recovered moderately failing ones"
        );
        metrics::record_recovery(recovered);
        recovered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn registry_with(ids: &[&str]) -> (HealthRegistry, Vec<Resource>) {
        let registry = HealthRegistry::new(HealthPolicy::default());
        let resources: Vec<Resource> = ids.iter().map(|id| Resource::from(*id)).collect();
        for r in &resources {
            registry.register(r.clone());
        }
        (registry, resources)
    }

    fn fail(registry: &HealthRegistry, resource: &Resource, times: usize) {
        for _ in 0..times {
            registry
                .record_outcome(resource, false, Duration::from_millis(5))
                .unwrap();
        }
    }

    #[test]
    fn test_unknown_resource_is_reported() {
        let (registry, _) = registry_with(&["a:1"]);
        let ghost = Resource::from("ghost:1");

        let err = registry
            .record_outcome(&ghost, true, Duration::ZERO)
            .unwrap_err();
        assert_eq!(err, PoolError::UnknownResource(ghost.clone()));
        assert!(registry.is_healthy(&ghost).is_err());
    }

    #[test]
    fn test_register_is_idempotent() {
        let (registry, resources) = registry_with(&["a:1"]);
        fail(&registry, &resources[0], 2);
        assert!(!registry.register(resources[0].clone()));
        assert_eq!(registry.stats(&resources[0]).unwrap().failure_count, 2);
    }

    #[test]
    fn test_concurrent_register_admits_once() {
        let registry = Arc::new(HealthRegistry::new(HealthPolicy::default()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || registry.register(Resource::from("a:1")))
            })
            .collect();
        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|new| *new)
            .count();
        assert_eq!(admitted, 1);
    }

    #[test]
    fn test_check_results_are_not_attempts() {
        let (registry, resources) = registry_with(&["a:1"]);
        for _ in 0..12 {
            registry.record_probe(&resources[0], true).unwrap();
        }
        let stats = registry.stats(&resources[0]).unwrap();
        assert_eq!(stats.total_attempts, 0);
        assert_eq!(stats.success_count, 0);

        for _ in 0..5 {
            registry.record_probe(&resources[0], false).unwrap();
        }
        assert!(registry.stats(&resources[0]).unwrap().banned);
        assert!(registry.record_probe(&Resource::from("ghost:1"), true).is_err());
    }

    #[test]
    fn test_recover_only_when_exhausted() {
        let (registry, resources) = registry_with(&["a:1", "b:1"]);
        fail(&registry, &resources[0], 5);

        assert_eq!(registry.recover_if_exhausted(&resources), 0);
        assert!(registry.stats(&resources[0]).unwrap().banned);
    }

    #[test]
    fn test_recover_skips_hard_failures() {
        let (registry, resources) = registry_with(&["a:1", "b:1", "c:1"]);
        fail(&registry, &resources[0], 5);
        fail(&registry, &resources[1], 10);
        fail(&registry, &resources[2], 12);

        assert_eq!(registry.recover_if_exhausted(&resources), 1);

        let a = registry.stats(&resources[0]).unwrap();
        assert!(!a.banned);
        assert_eq!(a.consecutive_failures, 0);
        assert!(registry.is_healthy(&resources[0]).unwrap());

        for dead in &resources[1..] {
            let stats = registry.stats(dead).unwrap();
            assert!(stats.banned);
            assert!(stats.consecutive_failures >= 10);
        }
    }

    #[test]
    fn test_concurrent_outcomes_do_not_lose_updates() {
        let (registry, resources) = registry_with(&["a:1", "b:1"]);
        let registry = Arc::new(registry);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = registry.clone();
                let resource = resources[i % 2].clone();
                std::thread::spawn(move || {
                    for n in 0..250 {
                        registry
                            .record_outcome(&resource, n % 3 != 0, Duration::from_millis(1))
                            .unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        for r in &resources {
            let stats = registry.stats(r).unwrap();
            assert_eq!(stats.total_attempts, 1000);
            assert_eq!(stats.total_attempts, stats.success_count + stats.failure_count);
        }
    }
}
