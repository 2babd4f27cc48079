//! Monotonic time abstraction for the estimator.
//!
//! Both tasks need a monotonic microsecond counter: the acquisition task to
//! decide whether it is still inside the boot warm-up window, the estimator to
//! measure the elapsed time between successful cycles (variable-rate
//! integration). The firmware crate implements this on top of the Embassy time
//! driver; tests use [`MockTime`].

use core::cell::Cell;

/// Platform-agnostic monotonic clock.
///
/// # Example
///
/// ```
/// use revo_ahrs_core::traits::{MockTime, TimeSource};
///
/// let time = MockTime::new();
/// time.advance(2_000);
/// assert_eq!(time.now_us(), 2_000);
/// assert!((time.seconds_since(0) - 0.002).abs() < 1e-9);
/// ```
pub trait TimeSource {
    /// Microseconds since boot.
    fn now_us(&self) -> u64;

    /// Milliseconds since boot.
    fn now_ms(&self) -> u64 {
        self.now_us() / 1000
    }

    /// Seconds elapsed since `reference_us`, saturating at zero.
    fn seconds_since(&self, reference_us: u64) -> f32 {
        self.now_us().saturating_sub(reference_us) as f32 / 1_000_000.0
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now_us(&self) -> u64 {
        (**self).now_us()
    }
}

/// Manually driven clock for host tests.
#[derive(Debug, Clone, Default)]
pub struct MockTime {
    current_us: Cell<u64>,
}

impl MockTime {
    /// Clock starting at boot (t = 0).
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock starting at `us` microseconds after boot.
    pub fn with_initial(us: u64) -> Self {
        Self {
            current_us: Cell::new(us),
        }
    }

    /// Jump to an absolute time.
    pub fn set(&self, us: u64) {
        self.current_us.set(us);
    }

    /// Move the clock forward.
    pub fn advance(&self, us: u64) {
        self.current_us.set(self.current_us.get() + us);
    }
}

impl TimeSource for MockTime {
    fn now_us(&self) -> u64 {
        self.current_us.get()
    }
}
