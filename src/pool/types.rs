//! Pool identifiers, errors and read-only reports.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// An egress resource identifier (address, proxy URL, ...).
///
/// Opaque to the pool; immutable once admitted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resource(String);

impl Resource {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Resource {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Resource {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for Resource {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Errors surfaced by pool operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// The pool was built from an empty resource set.
    #[error("resource pool is empty")]
    EmptyPool,

    /// An identifier that was never admitted to the pool.
    #[error("unknown resource '{0}'")]
    UnknownResource(Resource),
}

/// Result type for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;

/// Aggregate view of the pool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolSummary {
    pub total_resources: usize,
    pub healthy_resources: usize,
    pub banned_resources: usize,
    pub total_attempts: u64,
    /// Mean of per-resource success rates.
    pub average_success_rate: f64,
}

/// Detailed view of a single resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourcePerformance {
    pub resource: Resource,
    pub group: Option<String>,
    pub total_attempts: u64,
    pub success_rate: f64,
    pub average_latency_secs: Option<f64>,
    pub healthy: bool,
    pub banned: bool,
    pub consecutive_failures: u64,
}
