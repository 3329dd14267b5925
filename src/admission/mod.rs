//! Admission subsystem.
//!
//! # Data Flow
//! ```text
//! Candidate resources
//!     → validator.rs (fan out one probe per resource)
//!         → probe.rs (fetch probe target through the resource)
//!         → classify.rs (provider keyword heuristic)
//!     → ValidationResult per resource
//!     → accepted resources admitted to the pool
//! ```
//!
//! # Design Decisions
//! - `Prober` is a trait so the health sweep and tests can swap transports
//! - Every probe has its own deadline
//! - Rejections carry human-readable reasons

pub mod classify;
pub mod probe;
pub mod validator;

pub use classify::{Classification, Classifier};
pub use probe::{HttpProber, ProbeError, ProbeReport, Prober};
pub use validator::{ValidationResult, Validator};
