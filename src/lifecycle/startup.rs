//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Validate resources before admission
//! - Build the shared pool
//!
//! # Design Decisions
//! - Fail fast: a config error or an empty pool is fatal
//! - Small lists are trusted as-is (probing a handful of resources
//!   costs more startup time than it saves)
//! - A thin pool is a warning, not an error

use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::admission::{Prober, Validator};
use crate::config::{load_config, ConfigError, PoolConfig, ResourceConfig};
use crate::pool::{PoolError, Resource, ResourcePool};

/// Pools smaller than this get a warning.
const RECOMMENDED_POOL_SIZE: usize = 10;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Pool error: {0}")]
    Pool(#[from] PoolError),
}

/// Load `path` and bootstrap a pool from it.
pub async fn start(path: &Path) -> Result<(PoolConfig, Arc<ResourcePool>), StartupError> {
    let config = load_config(path)?;
    tracing::info!(
        path = %path.display(),
        resources = config.resources.len(),
        strategy = config.pool.strategy.as_str(),
        "Configuration loaded"
    );
    let pool = bootstrap(&config).await?;
    Ok((config, pool))
}

/// Validate the configured resources over HTTP and build the pool.
pub async fn bootstrap(config: &PoolConfig) -> Result<Arc<ResourcePool>, StartupError> {
    let validator = Validator::from_config(&config.validation);
    bootstrap_with(config, &validator).await
}

/// Build the pool, validating resources with `validator` when enabled.
pub async fn bootstrap_with<P: Prober>(
    config: &PoolConfig,
    validator: &Validator<P>,
) -> Result<Arc<ResourcePool>, StartupError> {
    let total = config.resources.len();
    let resources = if config.validation.enabled && total > config.validation.skip_below {
        admit_validated(config, validator).await
    } else {
        if config.validation.enabled {
            tracing::info!(resources = total, "Small resource list, skipping validation");
        }
        config.resources.clone()
    };

    let pool = ResourcePool::new(
        resources,
        config.health.clone().into(),
        config.pool.strategy,
        config.pool.seed,
    )?;

    if pool.len() < RECOMMENDED_POOL_SIZE {
        tracing::warn!(
            resources = pool.len(),
            recommended = RECOMMENDED_POOL_SIZE,
            "Resource pool is small; expect frequent reuse"
        );
    }
    Ok(Arc::new(pool))
}

async fn admit_validated<P: Prober>(
    config: &PoolConfig,
    validator: &Validator<P>,
) -> Vec<ResourceConfig> {
    let candidates: Vec<Resource> = config
        .resources
        .iter()
        .map(|r| Resource::new(r.address.trim()))
        .collect();

    tracing::info!(resources = candidates.len(), "Validating resources");
    let results = validator.validate_report(&candidates).await;

    // Configured groups win over reported country codes.
    let admitted: Vec<ResourceConfig> = config
        .resources
        .iter()
        .zip(&results)
        .filter(|(_, result)| result.accepted)
        .map(|(configured, result)| ResourceConfig {
            address: result.resource.to_string(),
            group: configured
                .group
                .clone()
                .or_else(|| result.country_code.clone()),
        })
        .collect();

    tracing::info!(
        accepted = admitted.len(),
        total = candidates.len(),
        "Validation complete"
    );
    if admitted.len() * 2 < candidates.len() {
        tracing::warn!(
            accepted = admitted.len(),
            total = candidates.len(),
            "Fewer than half of the resources passed validation"
        );
    }
    admitted
}
