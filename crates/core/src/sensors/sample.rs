//! Sensor sample types and the fixed sensor-to-body axis remap.

use nalgebra::Vector3;

/// Which physical sensor a reading or error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Accelerometer,
    Gyroscope,
    Magnetometer,
}

impl SensorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorKind::Accelerometer => "accel",
            SensorKind::Gyroscope => "gyro",
            SensorKind::Magnetometer => "mag",
        }
    }
}

/// One raw reading from a driver FIFO, in sensor-frame counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawSample {
    pub x: i16,
    pub y: i16,
    pub z: i16,
    /// Raw die temperature (driver-specific encoding)
    pub temperature: i16,
}

impl RawSample {
    pub const fn new(x: i16, y: i16, z: i16) -> Self {
        Self {
            x,
            y,
            z,
            temperature: 0,
        }
    }

    pub const fn with_temperature(mut self, temperature: i16) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Calibrated 3-axis sample in body frame and physical units.
///
/// Accelerometer samples are in g-scaled units (gravity reads as
/// `(0, 0, -1)` scaled when level), gyroscope samples in deg/s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSample {
    pub value: Vector3<f32>,
    /// Die temperature in °C
    pub temperature: f32,
}

impl SensorSample {
    /// All-zero sample, usable in `static` initializers
    pub const ZERO: Self = Self {
        value: Vector3::new(0.0, 0.0, 0.0),
        temperature: 0.0,
    };

    pub const fn new(value: Vector3<f32>, temperature: f32) -> Self {
        Self { value, temperature }
    }
}

impl Default for SensorSample {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Remap a sensor-frame vector into the body frame.
///
/// `x <- y`, `y <- x`, `z <- -z`. Fixed by the board layout.
#[inline]
pub fn remap_to_body(v: Vector3<f32>) -> Vector3<f32> {
    Vector3::new(v.y, v.x, -v.z)
}
