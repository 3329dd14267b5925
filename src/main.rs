//! Egress resource pool manager.
//!
//! `validate` probes the configured resources once and prints the results;
//! `monitor` builds the pool and keeps it healthy until interrupted.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;

use egress_pool::admission::{Validator, ValidationResult};
use egress_pool::config::{load_config, PoolConfig};
use egress_pool::health::HealthSweep;
use egress_pool::lifecycle::{bootstrap, spawn_signal_handler, Shutdown};
use egress_pool::observability::{logging, metrics};
use egress_pool::pool::{Resource, ResourcePool};

#[derive(Parser)]
#[command(name = "egress-pool")]
#[command(about = "Health-aware pool manager for egress proxies", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "egress-pool.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe every configured resource and print the results as JSON
    Validate,
    /// Build the pool and run the health sweep until interrupted
    Monitor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        resources = config.resources.len(),
        "egress-pool starting"
    );

    match cli.command {
        Commands::Validate => {
            let results = validate(&config).await;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Commands::Monitor => monitor(config).await?,
    }
    Ok(())
}

async fn validate(config: &PoolConfig) -> Vec<ValidationResult> {
    let validator = Validator::from_config(&config.validation);
    let resources: Vec<Resource> = config
        .resources
        .iter()
        .map(|r| Resource::new(r.address.trim()))
        .collect();
    validator.validate_report(&resources).await
}

async fn monitor(config: PoolConfig) -> Result<(), Box<dyn std::error::Error>> {
    let shutdown = Shutdown::new();
    spawn_signal_handler(shutdown.clone());

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let pool = bootstrap(&config).await?;

    let sweep = if config.health_check.enabled {
        let sweep = HealthSweep::from_config(pool.clone(), &config.health_check);
        Some(tokio::spawn(sweep.run(shutdown.subscribe())))
    } else {
        tracing::info!("Health sweep disabled");
        None
    };

    report_summaries(
        &pool,
        Duration::from_secs(config.observability.summary_interval_secs),
        &shutdown,
    )
    .await;

    if let Some(handle) = sweep {
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Health sweep task failed");
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn report_summaries(pool: &Arc<ResourcePool>, every: Duration, shutdown: &Shutdown) {
    let mut rx = shutdown.subscribe();
    let mut ticker = time::interval(every);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let summary = pool.summary();
                tracing::info!(
                    total = summary.total_resources,
                    healthy = summary.healthy_resources,
                    banned = summary.banned_resources,
                    attempts = summary.total_attempts,
                    average_success_rate = summary.average_success_rate,
                    "Pool summary"
                );
                metrics::record_summary(&summary);
            }
            _ = rx.recv() => break,
        }
    }
}
