//! FIFO drain and oversampling average.
//!
//! Each acquisition cycle empties the driver FIFO completely and averages
//! everything it held. This acts as a decimation filter from the sensor
//! output rate down to the 500 Hz task rate.
//!
//! Both loops are bounded. A driver that never reports data, or never
//! reports empty, cannot stall the acquisition task.

use super::driver::{FifoSensor, SensorError};
use nalgebra::Vector3;

/// Maximum "not ready" polls before a cycle is declared a read failure.
pub const MAX_FIFO_POLLS: u32 = 256;

/// Maximum readings accumulated in one drain (above any hardware FIFO depth).
pub const MAX_FIFO_READS: u32 = 128;

/// Mean of one FIFO drain, still in sensor frame and raw counts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FifoAverage {
    pub mean: Vector3<f32>,
    /// Number of readings averaged (N ≥ 1)
    pub count: u32,
    /// Raw temperature of the last reading
    pub temperature: i16,
}

/// Drain `sensor` and average the readings.
///
/// Polls until the first reading arrives, then reads until the driver
/// reports empty. Fails with [`SensorError::NoData`] if nothing arrives within
/// [`MAX_FIFO_POLLS`].
pub fn drain_fifo<S: FifoSensor + ?Sized>(sensor: &mut S) -> Result<FifoAverage, SensorError> {
    let mut first = None;
    for _ in 0..MAX_FIFO_POLLS {
        if let Some(reading) = sensor.read_fifo() {
            first = Some(reading);
            break;
        }
    }
    let Some(mut reading) = first else {
        return Err(SensorError::NoData(sensor.kind()));
    };

    let mut sum = [0i32; 3];
    let mut count = 0u32;
    loop {
        sum[0] += reading.x as i32;
        sum[1] += reading.y as i32;
        sum[2] += reading.z as i32;
        count += 1;

        if count >= MAX_FIFO_READS {
            break;
        }
        match sensor.read_fifo() {
            Some(next) => reading = next,
            None => break,
        }
    }

    let n = count as f32;
    Ok(FifoAverage {
        mean: Vector3::new(sum[0] as f32 / n, sum[1] as f32 / n, sum[2] as f32 / n),
        count,
        temperature: reading.temperature,
    })
}
