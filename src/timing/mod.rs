//! Adaptive pacing subsystem.
//!
//! # Data Flow
//! ```text
//! Attempt finished:
//!     → controller.rs record_attempt(sample)
//!
//! Before next attempt:
//!     → controller.rs should_rotate() (force a different resource?)
//!     → controller.rs next_delay() / failure_backoff()
//!         → distribution.rs (uniform / normal draws)
//! ```
//!
//! # Design Decisions
//! - Not resource-specific: pacing is learned over all attempts
//! - Seedable RNG so tests are reproducible

pub mod controller;
pub mod distribution;

pub use controller::{AdaptiveTiming, Outcome, TimingSample};
