//! Service layer for the fan control loop
//!
//! Services encapsulate the control loop lifecycle and its cancellation.

pub mod shutdown;
pub mod supervisor;

pub use shutdown::ShutdownSignal;
pub use supervisor::{CycleReport, Supervisor, SupervisorConfig, SupervisorState};
