//! Sensor model for attitude acquisition
//!
//! Raw readings come out of driver FIFOs in sensor frame and counts. The
//! acquisition task averages each drain, remaps it to the body frame and
//! scales it to physical units, producing a [`SensorSample`].

pub mod driver;
pub mod fifo;
pub mod mock;
pub mod sample;

pub use driver::{FifoSensor, Magnetometer, SensorError, SensorFault, TemperatureModel};
pub use fifo::{drain_fifo, FifoAverage, MAX_FIFO_POLLS, MAX_FIFO_READS};
pub use mock::{MockFifoSensor, MockMagnetometer};
pub use sample::{remap_to_body, RawSample, SensorKind, SensorSample};
