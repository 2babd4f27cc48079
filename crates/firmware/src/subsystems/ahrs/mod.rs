//! Attitude estimation subsystem
//!
//! Two cooperating tasks plus a settings reactor around one shared
//! [`FilterContext`]:
//!
//! ```text
//!  SensorAcquisition ──gyro queue (10)──┐
//!      (500 Hz)      ──accel queue (10)─┤
//!         │                             ▼
//!         │ yaw bias            AttitudeEstimator
//!         ▼                             │ x/y bias, attitude
//!  ┌──────────────────── FilterContext ─┴──────────┐
//!  │ config snapshot · gains · gyro bias · records │
//!  └───────────────────────▲───────────────────────┘
//!                          │
//!                  SettingsReactor ◄── SettingsStore (change signal)
//! ```
//!
//! Each task is a synchronous per-cycle step plus an async loop behind the
//! `embassy` feature, so host tests drive the steps directly.

pub mod acquisition;
pub mod context;
pub mod estimator;
pub mod queues;
pub mod services;
pub mod settings;

pub use acquisition::{AcquisitionState, SensorAcquisition, SensorCycle, SensorSet, SensorTick};
pub use context::{ConfigHandle, ConfigSnapshot, FilterContext};
pub use estimator::{AttitudeEstimator, SamplePair, NOMINAL_DT_S, RECEIVE_TIMEOUT_MS};
pub use queues::{push_sample, QueueFull, SensorQueue, SensorQueues, SENSOR_QUEUE_SIZE};
pub use services::TaskServices;
pub use settings::{apply_to_context, SettingsReactor, SettingsStore};

#[cfg(feature = "embassy")]
pub use acquisition::run_sensor_task;
#[cfg(feature = "embassy")]
pub use estimator::run_attitude_task;
