//! Resource pool subsystem.
//!
//! # Data Flow
//! ```text
//! Startup / admission
//!     → manager.rs (register resource, assign group)
//!
//! Per unit of work:
//!     caller → select_next(preference)
//!         → selection strategy over registry snapshot
//!         → stamp last_used_at
//!     caller → record_outcome(resource, success, latency)
//!         → health registry
//! ```
//!
//! # Design Decisions
//! - The pool is an owned structure shared by `Arc`; no global state
//! - Membership only grows; resources are banned, never removed
//! - Unknown identifiers in outcome reports are errors, not ignored

pub mod groups;
pub mod manager;
pub mod types;

pub use groups::GroupIndex;
pub use manager::ResourcePool;
pub use types::{PoolError, PoolResult, PoolSummary, Resource, ResourcePerformance};
