//! Score-based selection with a randomized top band.
//!
//! # Algorithm
//! ```text
//! candidates = healthy resources
//!     (none healthy → recover exhausted pool, use every resource)
//!     → narrow to preferred group when the intersection is non-empty
//!     → score = 0.5 * success_rate * 100
//!             + 0.3 * 100 / (attempts + 1)
//!             + 0.2 * min(100, minutes since last use)
//!     → sort descending, keep the top band (5)
//!     → pick uniformly inside the band
//! ```
//!
//! # Design Decisions
//! - Reliability, low usage and idle time all raise the score
//! - The final pick is random so the order of use does not follow the
//!   argmax and stays unpredictable to an observer

use rand::rngs::StdRng;
use rand::Rng;
use std::cmp::Ordering;
use std::time::Instant;

use crate::health::state::ResourceStats;
use crate::pool::types::Resource;
use crate::selection::{Candidate, SelectionContext, SelectionStrategy};

/// Size of the band the final pick is drawn from.
pub const TOP_BAND: usize = 5;

const SUCCESS_WEIGHT: f64 = 0.5;
const USAGE_WEIGHT: f64 = 0.3;
const RECENCY_WEIGHT: f64 = 0.2;
const FACTOR_CAP: f64 = 100.0;

/// Score a resource at time `now`. Never-used resources get the full
/// recency factor.
pub fn score(stats: &ResourceStats, now: Instant) -> f64 {
    let success_factor = stats.success_rate() * 100.0;
    let usage_factor = 100.0 / (stats.total_attempts as f64 + 1.0);
    let recency_factor = stats
        .last_used_at
        .map(|t| now.saturating_duration_since(t).as_secs_f64() / 60.0)
        .unwrap_or(FACTOR_CAP)
        .min(FACTOR_CAP);

    success_factor * SUCCESS_WEIGHT + usage_factor * USAGE_WEIGHT + recency_factor * RECENCY_WEIGHT
}

/// Score `candidates` and return the best `TOP_BAND` of them, best first.
/// Equal scores keep their pool order.
pub fn top_band(candidates: &[Candidate], now: Instant) -> Vec<(Resource, f64)> {
    let mut scored: Vec<(Resource, f64)> = candidates
        .iter()
        .map(|c| (c.resource.clone(), score(&c.stats, now)))
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored.truncate(TOP_BAND);
    scored
}

#[derive(Debug, Default)]
pub struct Intelligent;

impl Intelligent {
    pub fn new() -> Self {
        Self
    }

    /// Candidate set after health filtering, recovery and group narrowing.
    pub fn candidates(&self, ctx: &SelectionContext<'_>) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> =
            ctx.candidates().into_iter().filter(|c| c.healthy).collect();

        if candidates.is_empty() {
            ctx.registry.recover_if_exhausted(ctx.resources);
            candidates = ctx.candidates();
        }

        if let Some(preferred) = ctx.preferred {
            let narrowed: Vec<Candidate> = candidates
                .iter()
                .filter(|c| preferred.contains(&c.resource))
                .cloned()
                .collect();
            if !narrowed.is_empty() {
                candidates = narrowed;
            }
        }

        candidates
    }
}

impl SelectionStrategy for Intelligent {
    fn next_resource(&self, ctx: &SelectionContext<'_>, rng: &mut StdRng) -> Option<Resource> {
        let band = top_band(&self.candidates(ctx), ctx.now);
        if band.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..band.len());
        band.into_iter().nth(index).map(|(resource, _)| resource)
    }

    fn name(&self) -> &'static str {
        "intelligent"
    }
}
