//! Bounded sample queues between acquisition and estimation.
//!
//! One queue per stream. The producer never blocks: when a queue is full the
//! newest sample is dropped and the queue keeps the oldest ten.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use revo_ahrs_core::sensors::SensorSample;

/// Capacity of each sensor queue
pub const SENSOR_QUEUE_SIZE: usize = 10;

/// Bounded FIFO of calibrated samples
pub type SensorQueue = Channel<CriticalSectionRawMutex, SensorSample, SENSOR_QUEUE_SIZE>;

/// The sample did not fit; it has been dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFull;

/// Gyro and accel queues
pub struct SensorQueues {
    pub gyro: SensorQueue,
    pub accel: SensorQueue,
}

impl SensorQueues {
    pub const fn new() -> Self {
        Self {
            gyro: Channel::new(),
            accel: Channel::new(),
        }
    }
}

impl Default for SensorQueues {
    fn default() -> Self {
        Self::new()
    }
}

/// Non-blocking push. A full queue drops `sample`, not a queued one.
pub fn push_sample(queue: &SensorQueue, sample: SensorSample) -> Result<(), QueueFull> {
    queue.try_send(sample).map_err(|_| QueueFull)
}
