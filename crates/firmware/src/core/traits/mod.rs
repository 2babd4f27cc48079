//! Firmware-side trait implementations.
//!
//! ```text
//!   TimeSource ── EmbassyTime (target) / MockTime (host)
//!   SharedState ── EmbassyState<T> (critical-section mutex)
//! ```
//!
//! Alarm, watchdog and flight-status traits come from the core crate and are
//! re-exported here so firmware code has one import path.

pub mod sync;
pub mod time;

pub use revo_ahrs_core::traits::{
    AlarmChannel, AlarmSeverity, AlarmSink, ArmedState, FlightStatus, Watchdog, WatchdogFlag,
};
pub use sync::{EmbassyState, SharedState};
#[cfg(feature = "embassy")]
pub use time::EmbassyTime;
pub use time::{MockTime, TimeSource};
