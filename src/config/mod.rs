//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → PoolConfig (validated, immutable)
//!     → handed to startup, which builds the pool and background tasks
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the resource set is fixed at startup
//!   apart from explicit admissions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::HealthCheckConfig;
pub use schema::HealthPolicyConfig;
pub use schema::ObservabilityConfig;
pub use schema::PoolConfig;
pub use schema::ResourceConfig;
pub use schema::StrategyKind;
pub use schema::TimingConfig;
pub use schema::ValidationConfig;
