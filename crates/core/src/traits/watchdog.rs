//! Watchdog heartbeat interface.
//!
//! Each task owns one flag and must feed it on every loop iteration,
//! including error iterations and the post-self-test halt loop. A flag that
//! stops being fed is treated by the external supervisor as a hung task.

use core::cell::Cell;

/// Per-task watchdog flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogFlag {
    /// Sensor acquisition task
    Sensors,
    /// Attitude estimator task
    Attitude,
}

/// Watchdog subsystem consumed by both tasks.
pub trait Watchdog {
    /// Refresh the heartbeat for `flag`.
    fn feed(&self, flag: WatchdogFlag);
}

impl<W: Watchdog + ?Sized> Watchdog for &W {
    fn feed(&self, flag: WatchdogFlag) {
        (**self).feed(flag)
    }
}

/// Counting watchdog for host tests.
#[derive(Debug, Default)]
pub struct MockWatchdog {
    sensors: Cell<u32>,
    attitude: Cell<u32>,
}

impl MockWatchdog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of feeds received for `flag`.
    pub fn feeds(&self, flag: WatchdogFlag) -> u32 {
        match flag {
            WatchdogFlag::Sensors => self.sensors.get(),
            WatchdogFlag::Attitude => self.attitude.get(),
        }
    }
}

impl Watchdog for MockWatchdog {
    fn feed(&self, flag: WatchdogFlag) {
        let counter = match flag {
            WatchdogFlag::Sensors => &self.sensors,
            WatchdogFlag::Attitude => &self.attitude,
        };
        counter.set(counter.get() + 1);
    }
}
