//! Round-robin selection strategy.

use rand::rngs::StdRng;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::pool::types::Resource;
use crate::selection::{SelectionContext, SelectionStrategy};

/// Round-robin selector.
/// Walks the pool in fixed order from an internal cursor, skipping
/// unhealthy resources for at most one lap.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SelectionStrategy for RoundRobin {
    fn next_resource(&self, ctx: &SelectionContext<'_>, _rng: &mut StdRng) -> Option<Resource> {
        let len = ctx.resources.len();
        if len == 0 {
            return None;
        }

        let policy = ctx.registry.policy();
        let start = self.cursor.load(Ordering::Relaxed) % len;

        for i in 0..len {
            let index = (start + i) % len;
            let resource = &ctx.resources[index];
            let healthy = ctx
                .registry
                .stats(resource)
                .map(|s| s.is_healthy(policy))
                .unwrap_or(false);
            if healthy {
                self.cursor.store(index + 1, Ordering::Relaxed);
                return Some(resource.clone());
            }
        }

        // A full lap found nothing healthy: hand out the cursor position
        // anyway rather than fail.
        self.cursor.store(start + 1, Ordering::Relaxed);
        Some(ctx.resources[start].clone())
    }

    fn name(&self) -> &'static str {
        "round_robin"
    }
}
