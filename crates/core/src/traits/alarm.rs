//! System alarm interface.
//!
//! Failures never cross task boundaries as errors. They are surfaced as a
//! severity level on a named alarm channel, which external supervision and
//! telemetry observe.

use core::cell::Cell;

/// Alarm channels written by the attitude subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmChannel {
    /// Sensor hardware health (self-test)
    Sensors,
    /// Attitude pipeline health (reads, queues, estimator)
    Attitude,
}

impl AlarmChannel {
    const COUNT: usize = 2;

    fn index(self) -> usize {
        match self {
            AlarmChannel::Sensors => 0,
            AlarmChannel::Attitude => 1,
        }
    }

    /// Channel name for logging
    pub fn as_str(&self) -> &'static str {
        match self {
            AlarmChannel::Sensors => "SENSORS",
            AlarmChannel::Attitude => "ATTITUDE",
        }
    }
}

/// Alarm severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AlarmSeverity {
    /// Degraded but operating (e.g. a dropped sample)
    Warning,
    /// Cycle failed, previous state retained
    Error,
    /// Subsystem halted, vehicle must not fly
    Critical,
}

impl AlarmSeverity {
    /// Severity name for logging
    pub fn as_str(&self) -> &'static str {
        match self {
            AlarmSeverity::Warning => "WARNING",
            AlarmSeverity::Error => "ERROR",
            AlarmSeverity::Critical => "CRITICAL",
        }
    }
}

/// Alarm subsystem consumed by both tasks.
///
/// Methods take `&self`: the sink is shared between the acquisition task and
/// the estimator, so implementations provide their own interior mutability.
pub trait AlarmSink {
    /// Raise `channel` to `severity`, replacing the previous level.
    fn set_alarm(&self, channel: AlarmChannel, severity: AlarmSeverity);

    /// Return `channel` to the healthy state.
    fn clear_alarm(&self, channel: AlarmChannel);
}

impl<A: AlarmSink + ?Sized> AlarmSink for &A {
    fn set_alarm(&self, channel: AlarmChannel, severity: AlarmSeverity) {
        (**self).set_alarm(channel, severity)
    }

    fn clear_alarm(&self, channel: AlarmChannel) {
        (**self).clear_alarm(channel)
    }
}

/// Recording alarm sink for host tests.
///
/// Keeps the current level per channel plus a count of every `set_alarm`
/// call per severity, so transient alarms that were cleared later in the same
/// cycle remain observable.
#[derive(Debug, Default)]
pub struct MockAlarms {
    current: [Cell<Option<AlarmSeverity>>; AlarmChannel::COUNT],
    raised: [[Cell<u32>; 3]; AlarmChannel::COUNT],
}

impl MockAlarms {
    /// Sink with every channel healthy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current level of `channel`, `None` when cleared.
    pub fn level(&self, channel: AlarmChannel) -> Option<AlarmSeverity> {
        self.current[channel.index()].get()
    }

    /// How many times `channel` was raised to `severity`.
    pub fn raised_count(&self, channel: AlarmChannel, severity: AlarmSeverity) -> u32 {
        self.raised[channel.index()][severity_index(severity)].get()
    }
}

fn severity_index(severity: AlarmSeverity) -> usize {
    match severity {
        AlarmSeverity::Warning => 0,
        AlarmSeverity::Error => 1,
        AlarmSeverity::Critical => 2,
    }
}

impl AlarmSink for MockAlarms {
    fn set_alarm(&self, channel: AlarmChannel, severity: AlarmSeverity) {
        self.current[channel.index()].set(Some(severity));
        let counter = &self.raised[channel.index()][severity_index(severity)];
        counter.set(counter.get() + 1);
    }

    fn clear_alarm(&self, channel: AlarmChannel) {
        self.current[channel.index()].set(None);
    }
}
