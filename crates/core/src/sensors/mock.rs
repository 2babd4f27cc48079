//! Scripted sensor drivers for host tests.
//!
//! ```
//! use revo_ahrs_core::sensors::{drain_fifo, MockFifoSensor, RawSample};
//!
//! let mut gyro = MockFifoSensor::gyroscope(0.1);
//! gyro.push_burst(&[RawSample::new(10, 0, 0), RawSample::new(30, 0, 0)]);
//! let avg = drain_fifo(&mut gyro).unwrap();
//! assert_eq!(avg.mean.x, 20.0);
//! ```

use super::driver::{FifoSensor, Magnetometer, SensorFault, TemperatureModel};
use super::sample::{RawSample, SensorKind};
use heapless::Deque;

/// Scripted FIFO capacity (readings plus end-of-burst markers)
const SCRIPT_CAPACITY: usize = 256;

/// FIFO sensor that replays a script of readings.
///
/// The script holds `Some(reading)` entries and `None` markers. A `None`
/// entry is returned to the caller as "FIFO empty", which is how bursts are
/// separated between acquisition cycles.
pub struct MockFifoSensor {
    kind: SensorKind,
    scale: f32,
    temperature: TemperatureModel,
    script: Deque<Option<RawSample>, SCRIPT_CAPACITY>,
    /// Emitted once per drain when the script is exhausted
    repeating: Option<RawSample>,
    repeat_sent: bool,
    /// Emitted forever when the script is exhausted (faulty driver)
    never_empty: Option<RawSample>,
    self_test: Result<(), SensorFault>,
    reads: u32,
}

impl MockFifoSensor {
    pub fn new(kind: SensorKind, scale: f32) -> Self {
        Self {
            kind,
            scale,
            temperature: TemperatureModel::IDENTITY,
            script: Deque::new(),
            repeating: None,
            repeat_sent: false,
            never_empty: None,
            self_test: Ok(()),
            reads: 0,
        }
    }

    pub fn accelerometer(scale: f32) -> Self {
        Self::new(SensorKind::Accelerometer, scale)
    }

    pub fn gyroscope(scale: f32) -> Self {
        Self::new(SensorKind::Gyroscope, scale)
    }

    pub fn with_temperature_model(mut self, model: TemperatureModel) -> Self {
        self.temperature = model;
        self
    }

    /// Make the next self-test fail with `fault`.
    pub fn fail_self_test(&mut self, fault: SensorFault) {
        self.self_test = Err(fault);
    }

    /// Queue readings for one drain, followed by an "empty" marker.
    ///
    /// Readings that do not fit in the script are dropped.
    pub fn push_burst(&mut self, readings: &[RawSample]) {
        for reading in readings {
            let _ = self.script.push_back(Some(*reading));
        }
        let _ = self.script.push_back(None);
    }

    /// Queue `polls` "not ready" answers before the next reading.
    pub fn push_not_ready(&mut self, polls: usize) {
        for _ in 0..polls {
            let _ = self.script.push_back(None);
        }
    }

    /// Deliver `reading` as a one-sample burst on every drain once the
    /// script is exhausted.
    pub fn set_repeating(&mut self, reading: Option<RawSample>) {
        self.repeating = reading;
        self.repeat_sent = false;
    }

    /// Never report empty once the script is exhausted.
    pub fn set_never_empty(&mut self, reading: Option<RawSample>) {
        self.never_empty = reading;
    }

    /// Total successful reads served
    pub fn reads(&self) -> u32 {
        self.reads
    }
}

impl FifoSensor for MockFifoSensor {
    fn kind(&self) -> SensorKind {
        self.kind
    }

    fn self_test(&mut self) -> Result<(), SensorFault> {
        self.self_test
    }

    fn read_fifo(&mut self) -> Option<RawSample> {
        let reading = match self.script.pop_front() {
            Some(entry) => entry,
            None if self.never_empty.is_some() => self.never_empty,
            None => match self.repeating {
                Some(reading) if !self.repeat_sent => {
                    self.repeat_sent = true;
                    Some(reading)
                }
                _ => {
                    self.repeat_sent = false;
                    None
                }
            },
        };
        if reading.is_some() {
            self.reads += 1;
        }
        reading
    }

    fn scale_factor(&self) -> f32 {
        self.scale
    }

    fn temperature(&self, raw: i16) -> f32 {
        self.temperature.celsius(raw)
    }
}

/// Magnetometer with a single pending measurement slot.
#[derive(Debug, Default)]
pub struct MockMagnetometer {
    pending: Option<RawSample>,
    self_test: Option<SensorFault>,
}

impl MockMagnetometer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a measurement available for the next poll.
    pub fn set_pending(&mut self, reading: RawSample) {
        self.pending = Some(reading);
    }

    pub fn fail_self_test(&mut self, fault: SensorFault) {
        self.self_test = Some(fault);
    }
}

impl Magnetometer for MockMagnetometer {
    fn self_test(&mut self) -> Result<(), SensorFault> {
        match self.self_test {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }

    fn data_available(&mut self) -> bool {
        self.pending.is_some()
    }

    fn read_mag(&mut self) -> RawSample {
        self.pending.take().unwrap_or_default()
    }
}
