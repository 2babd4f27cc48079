//! Narrow sensor driver interfaces.
//!
//! Register access, FIFO configuration and scale lookup belong to the drivers.
//! Acquisition only needs to self-test, drain the FIFO and convert counts.

use super::sample::{RawSample, SensorKind};

/// Fault reported by a driver self-test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorFault {
    /// Device did not answer or returned the wrong ID
    NoResponse,
    /// Self-test response outside the datasheet window
    OutOfRange,
}

impl SensorFault {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorFault::NoResponse => "NoResponse",
            SensorFault::OutOfRange => "OutOfRange",
        }
    }
}

/// Errors raised by the acquisition pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// Boot self-test failed; fatal for the acquisition task
    SelfTest(SensorKind, SensorFault),
    /// FIFO produced no reading within the poll bound
    NoData(SensorKind),
}

impl SensorError {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorError::SelfTest(..) => "SelfTest",
            SensorError::NoData(_) => "NoData",
        }
    }

    pub fn sensor(&self) -> SensorKind {
        match self {
            SensorError::SelfTest(kind, _) | SensorError::NoData(kind) => *kind,
        }
    }
}

impl core::fmt::Display for SensorError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SensorError::SelfTest(kind, fault) => {
                write!(f, "{} self-test failed: {}", kind.as_str(), fault.as_str())
            }
            SensorError::NoData(kind) => write!(f, "{} FIFO returned no data", kind.as_str()),
        }
    }
}

/// Linear die-temperature conversion: `offset_c + (raw + raw_offset) / divisor`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureModel {
    pub offset_c: f32,
    pub raw_offset: f32,
    pub divisor: f32,
}

impl TemperatureModel {
    /// BMA180 accelerometer: 0.5 K/LSB around 25 °C
    pub const BMA180: Self = Self {
        offset_c: 25.0,
        raw_offset: -2.0,
        divisor: 2.0,
    };

    /// MPU6000 gyroscope: 340 LSB/K around 35 °C
    pub const MPU6000: Self = Self {
        offset_c: 35.0,
        raw_offset: 512.0,
        divisor: 340.0,
    };

    /// Raw value passed through unchanged
    pub const IDENTITY: Self = Self {
        offset_c: 0.0,
        raw_offset: 0.0,
        divisor: 1.0,
    };

    pub fn celsius(&self, raw: i16) -> f32 {
        self.offset_c + (raw as f32 + self.raw_offset) / self.divisor
    }
}

/// FIFO-backed inertial sensor (accelerometer or gyroscope).
pub trait FifoSensor {
    /// Which sensor this driver reads
    fn kind(&self) -> SensorKind;

    /// One-shot boot self-test
    fn self_test(&mut self) -> Result<(), SensorFault>;

    /// Pop one reading, `None` when the FIFO is empty
    fn read_fifo(&mut self) -> Option<RawSample>;

    /// Counts to physical units
    fn scale_factor(&self) -> f32;

    /// Raw die temperature to °C
    fn temperature(&self, raw: i16) -> f32;
}

/// Polled magnetometer.
pub trait Magnetometer {
    fn self_test(&mut self) -> Result<(), SensorFault>;

    /// Non-blocking check for a fresh measurement
    fn data_available(&mut self) -> bool;

    /// Read the latest measurement in sensor-frame counts
    fn read_mag(&mut self) -> RawSample;
}
