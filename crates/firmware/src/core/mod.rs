//! Firmware infrastructure
//!
//! Logging, shared-state primitives and task timing used by the attitude
//! subsystem. Pure logic lives in `revo_ahrs_core` and is re-exported where
//! firmware code expects it.

pub mod logging;
pub mod scheduler;
pub mod traits;

pub use revo_ahrs_core::parameters;
