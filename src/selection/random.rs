//! Uniform random selection among healthy resources.

use rand::rngs::StdRng;
use rand::Rng;

use crate::pool::types::Resource;
use crate::selection::{SelectionContext, SelectionStrategy};

#[derive(Debug, Default)]
pub struct RandomHealthy;

impl RandomHealthy {
    pub fn new() -> Self {
        Self
    }
}

impl SelectionStrategy for RandomHealthy {
    fn next_resource(&self, ctx: &SelectionContext<'_>, rng: &mut StdRng) -> Option<Resource> {
        let candidates = ctx.healthy_or_all();
        if candidates.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..candidates.len());
        Some(candidates[index].resource.clone())
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::test_support::{context, record, registry_with};
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_never_picks_unhealthy_while_healthy_exist() {
        let (registry, resources) = registry_with(&["a:1", "b:1", "c:1"]);
        record(&registry, &resources[0], false, 5);
        let ctx = context(&resources, &registry);
        let mut rng = StdRng::seed_from_u64(42);

        let picks: HashSet<Resource> = (0..200)
            .map(|_| RandomHealthy.next_resource(&ctx, &mut rng).unwrap())
            .collect();
        assert!(!picks.contains(&resources[0]));
        assert_eq!(picks.len(), 2);
    }

    #[test]
    fn test_falls_back_to_full_set() {
        let (registry, resources) = registry_with(&["a:1"]);
        record(&registry, &resources[0], false, 5);
        let ctx = context(&resources, &registry);
        let mut rng = StdRng::seed_from_u64(42);

        assert_eq!(RandomHealthy.next_resource(&ctx, &mut rng), Some(resources[0].clone()));
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let (registry, resources) = registry_with(&["a:1", "b:1", "c:1", "d:1"]);
        let ctx = context(&resources, &registry);

        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..20)
                .map(|_| RandomHealthy.next_resource(&ctx, &mut rng).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(9), run(9));
    }
}
