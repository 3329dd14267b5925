//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate resources → Build pool
//!
//! Driver (driver.rs):
//!     Select → Perform session → Record outcome → Wait recommended delay
//!
//! Shutdown (shutdown.rs):
//!     Trigger → Sweep, driver and reporters leave their loops
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then validation, then the pool
//! - Every background loop selects on the same shutdown broadcast
//! - Waits are interruptible; nothing sleeps through a shutdown

pub mod driver;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use driver::{Driver, DriverConfig, DriverReport, Session};
pub use shutdown::Shutdown;
pub use signals::{spawn_signal_handler, wait_for_signal};
pub use startup::{bootstrap, bootstrap_with, start, StartupError};
