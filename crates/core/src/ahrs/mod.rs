//! Attitude estimation
//!
//! Platform-agnostic pieces of the estimator: configuration state, the
//! complementary filter, the start-up gain schedule and the settings
//! recomputation. Task loops and shared state are in the firmware crate.

pub mod config;
pub mod error;
pub mod filter;
pub mod reactor;
pub mod rotation;
pub mod schedule;
pub mod state;

pub use config::{BoardRotation, CalibrationBias, FilterConfig, FilterGains};
pub use error::{EstimatorError, SampleSource};
pub use filter::{
    tilt_error, ComplementaryFilter, FilterStep, UpdateOutcome, MIN_ACCEL_NORM, MIN_DT_S,
    MIN_QUATERNION_NORM,
};
pub use reactor::{apply_settings, SettingsUpdate, GYRO_BIAS_SCALE};
pub use rotation::{
    canonical, euler_to_quaternion, predicted_gravity, quaternion_to_euler, quaternion_to_matrix,
};
pub use schedule::{GainSchedule, GainUpdate, WARMUP_END_MS, WARMUP_START_MS};
pub use state::{AttitudeState, UNIT_NORM_TOLERANCE};
