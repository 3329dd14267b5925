//! Egress resource pool manager library.

pub mod admission;
pub mod config;
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod pool;
pub mod selection;
pub mod timing;

pub use config::schema::PoolConfig;
pub use lifecycle::Shutdown;
pub use pool::{Resource, ResourcePool};
