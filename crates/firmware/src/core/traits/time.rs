//! Time source implementations.
//!
//! The `TimeSource` trait and `MockTime` live in the core crate; this module
//! adds the Embassy-backed implementation used on target.

pub use revo_ahrs_core::traits::{MockTime, TimeSource};

/// Embassy-based time source using the Embassy time driver.
///
/// Uses `embassy_time::Instant` for microsecond timestamps on embedded
/// targets with the Embassy async runtime.
#[cfg(feature = "embassy")]
#[derive(Clone, Copy, Default)]
pub struct EmbassyTime;

#[cfg(feature = "embassy")]
impl TimeSource for EmbassyTime {
    fn now_us(&self) -> u64 {
        embassy_time::Instant::now().as_micros()
    }

    fn now_ms(&self) -> u64 {
        embassy_time::Instant::now().as_millis()
    }
}
