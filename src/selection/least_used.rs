//! Least-used selection strategy.

use rand::rngs::StdRng;

use crate::pool::types::Resource;
use crate::selection::{SelectionContext, SelectionStrategy};

/// Least-used selector.
/// Selects the healthy resource with the fewest attempts. Ties go to the
/// smallest identifier so the choice is reproducible.
#[derive(Debug, Default)]
pub struct LeastUsed;

impl LeastUsed {
    pub fn new() -> Self {
        Self
    }
}

impl SelectionStrategy for LeastUsed {
    fn next_resource(&self, ctx: &SelectionContext<'_>, _rng: &mut StdRng) -> Option<Resource> {
        ctx.healthy_or_all()
            .into_iter()
            .min_by(|a, b| {
                a.stats
                    .total_attempts
                    .cmp(&b.stats.total_attempts)
                    .then_with(|| a.resource.cmp(&b.resource))
            })
            .map(|c| c.resource)
    }

    fn name(&self) -> &'static str {
        "least_used"
    }
}
