//! Health tracking subsystem.
//!
//! # Data Flow
//! ```text
//! Reported outcomes (registry.rs):
//!     Caller attempt finished
//!     → Update the resource's stats cell
//!     → Ban after too many consecutive failures
//!
//! Background sweep (active.rs):
//!     Periodic timer
//!     → Probe every resource (no lock held)
//!     → Apply each result through the registry
//!     → Recover if nothing healthy is left
//!
//! State (state.rs):
//!     Counters, latency average, ban flag
//!     Healthy = not banned, few consecutive failures, acceptable rate
//! ```
//!
//! # Design Decisions
//! - One lockable cell per resource, never a registry-wide lock
//! - Sweep results use the same path as caller outcomes
//! - Recovery never touches resources past the hard failure threshold

pub mod active;
pub mod registry;
pub mod state;

pub use active::{HealthSweep, SweepReport};
pub use registry::HealthRegistry;
pub use state::{HealthPolicy, ResourceStats};
