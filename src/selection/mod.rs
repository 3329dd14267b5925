//! Resource selection subsystem.
//!
//! # Data Flow
//! ```text
//! pool.select_next(preference)
//!     → snapshot resources + stats (SelectionContext)
//!     → Apply selection strategy:
//!         - intelligent.rs (score, keep top band, pick at random)
//!         - round_robin.rs (rotate, skipping unhealthy)
//!         - random.rs (uniform over healthy)
//!         - least_used.rs (fewest attempts)
//!     → pool stamps last_used_at on the chosen resource
//! ```
//!
//! # Design Decisions
//! - Strategies are stateless apart from the round-robin cursor
//! - Randomness comes from the pool's seedable RNG
//! - With no healthy candidate, strategies degrade to the full set
//!   instead of failing

pub mod intelligent;
pub mod least_used;
pub mod random;
pub mod round_robin;

use rand::rngs::StdRng;
use std::collections::BTreeSet;
use std::time::Instant;

use crate::config::StrategyKind;
use crate::health::registry::HealthRegistry;
use crate::health::state::ResourceStats;
use crate::pool::types::Resource;

pub use intelligent::Intelligent;
pub use least_used::LeastUsed;
pub use random::RandomHealthy;
pub use round_robin::RoundRobin;

/// A resource together with the stats it is judged on.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub resource: Resource,
    pub stats: ResourceStats,
    pub healthy: bool,
}

/// Everything a strategy may look at for one selection.
pub struct SelectionContext<'a> {
    /// Pool resources in admission order.
    pub resources: &'a [Resource],
    pub registry: &'a HealthRegistry,
    /// Members of the preferred group, if one was requested and exists.
    pub preferred: Option<&'a BTreeSet<Resource>>,
    pub now: Instant,
}

impl SelectionContext<'_> {
    /// Snapshot of every resource, in pool order.
    pub fn candidates(&self) -> Vec<Candidate> {
        let policy = self.registry.policy();
        self.resources
            .iter()
            .map(|r| {
                let stats = self.registry.stats(r).unwrap_or_default();
                Candidate {
                    resource: r.clone(),
                    healthy: stats.is_healthy(policy),
                    stats,
                }
            })
            .collect()
    }

    /// Healthy candidates, or every candidate when none is healthy.
    pub fn healthy_or_all(&self) -> Vec<Candidate> {
        let all = self.candidates();
        let healthy: Vec<Candidate> = all.iter().filter(|c| c.healthy).cloned().collect();
        if healthy.is_empty() {
            all
        } else {
            healthy
        }
    }
}

/// A resource selection policy.
pub trait SelectionStrategy: Send + Sync + std::fmt::Debug {
    /// Pick the next resource. `None` only for an empty pool.
    fn next_resource(&self, ctx: &SelectionContext<'_>, rng: &mut StdRng) -> Option<Resource>;

    fn name(&self) -> &'static str;
}

/// Build the strategy named in configuration.
pub fn build_strategy(kind: StrategyKind) -> Box<dyn SelectionStrategy> {
    match kind {
        StrategyKind::Intelligent => Box::new(Intelligent::new()),
        StrategyKind::RoundRobin => Box::new(RoundRobin::new()),
        StrategyKind::Random => Box::new(RandomHealthy::new()),
        StrategyKind::LeastUsed => Box::new(LeastUsed::new()),
    }
}
