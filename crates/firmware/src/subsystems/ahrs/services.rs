//! System services the attitude tasks talk to.

use crate::core::traits::{AlarmSink, FlightStatus, TimeSource, Watchdog};

/// Alarm, watchdog, flight status and clock handles for one task.
///
/// Trait objects keep the task types free of four extra type parameters;
/// each service is called at most a few times per cycle.
#[derive(Clone, Copy)]
pub struct TaskServices<'a> {
    pub alarms: &'a dyn AlarmSink,
    pub watchdog: &'a dyn Watchdog,
    pub flight: &'a dyn FlightStatus,
    pub time: &'a dyn TimeSource,
}

impl<'a> TaskServices<'a> {
    pub fn new(
        alarms: &'a dyn AlarmSink,
        watchdog: &'a dyn Watchdog,
        flight: &'a dyn FlightStatus,
        time: &'a dyn TimeSource,
    ) -> Self {
        Self {
            alarms,
            watchdog,
            flight,
            time,
        }
    }
}
