//! Shared filter context
//!
//! All state the acquisition task, the estimator and the settings reactor
//! share, threaded explicitly into each of them:
//!
//! - `ConfigHandle`: the configuration snapshot, swapped wholesale
//! - effective gains: what the filter uses this cycle (reactor or gain schedule)
//! - gyro bias: learned rate offset (producer writes z, estimator writes x/y)
//! - published records: last-value-wins outputs for external readers
//! - the two sample queues
//!
//! Every accessor takes one critical section, so a record is never observed
//! half-written.

use super::queues::SensorQueues;
use crate::core::traits::{EmbassyState, SharedState};
use nalgebra::Vector3;
use revo_ahrs_core::ahrs::{AttitudeState, FilterConfig, FilterGains};
use revo_ahrs_core::sensors::SensorSample;

/// Configuration plus the number of times it has been replaced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfigSnapshot {
    pub config: FilterConfig,
    pub generation: u32,
}

/// Atomically swapped configuration snapshot.
pub struct ConfigHandle {
    inner: EmbassyState<ConfigSnapshot>,
}

impl ConfigHandle {
    pub const fn new() -> Self {
        Self {
            inner: EmbassyState::new(ConfigSnapshot {
                config: FilterConfig::DEFAULT,
                generation: 0,
            }),
        }
    }

    /// Snapshot and generation in one read
    pub fn load(&self) -> ConfigSnapshot {
        self.inner.get()
    }

    pub fn config(&self) -> FilterConfig {
        self.inner.with(|snapshot| snapshot.config)
    }

    pub fn generation(&self) -> u32 {
        self.inner.with(|snapshot| snapshot.generation)
    }

    /// Replace the whole configuration; returns the new generation.
    pub fn store(&self, config: FilterConfig) -> u32 {
        self.inner.with_mut(|snapshot| {
            snapshot.config = config;
            snapshot.generation = snapshot.generation.wrapping_add(1);
            snapshot.generation
        })
    }
}

impl Default for ConfigHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// State shared by the attitude tasks.
///
/// Can be placed in a `static`:
///
/// ```ignore
/// static FILTER: FilterContext = FilterContext::new();
/// ```
pub struct FilterContext {
    config: ConfigHandle,
    gains: EmbassyState<FilterGains>,
    gyro_bias: EmbassyState<Vector3<f32>>,
    accels: EmbassyState<SensorSample>,
    gyros: EmbassyState<SensorSample>,
    gyros_uncorrected: EmbassyState<SensorSample>,
    magnetometer: EmbassyState<Vector3<f32>>,
    attitude: EmbassyState<AttitudeState>,
    queues: SensorQueues,
}

impl FilterContext {
    pub const fn new() -> Self {
        Self {
            config: ConfigHandle::new(),
            gains: EmbassyState::new(FilterGains::DEFAULT),
            gyro_bias: EmbassyState::new(Vector3::new(0.0, 0.0, 0.0)),
            accels: EmbassyState::new(SensorSample::ZERO),
            gyros: EmbassyState::new(SensorSample::ZERO),
            gyros_uncorrected: EmbassyState::new(SensorSample::ZERO),
            magnetometer: EmbassyState::new(Vector3::new(0.0, 0.0, 0.0)),
            attitude: EmbassyState::new(AttitudeState::identity()),
            queues: SensorQueues::new(),
        }
    }

    pub fn config(&self) -> &ConfigHandle {
        &self.config
    }

    pub fn queues(&self) -> &SensorQueues {
        &self.queues
    }

    // --- gains ---

    /// Gains in effect for the current cycle
    pub fn gains(&self) -> FilterGains {
        self.gains.get()
    }

    pub fn set_gains(&self, gains: FilterGains) {
        self.gains.set(gains);
    }

    // --- gyro bias ---

    pub fn gyro_bias(&self) -> Vector3<f32> {
        self.gyro_bias.get()
    }

    pub fn set_gyro_bias(&self, bias: Vector3<f32>) {
        self.gyro_bias.set(bias);
    }

    /// Add to the x/y bias axes; z is left to the acquisition task.
    pub fn adjust_gyro_bias_xy(&self, delta: Vector3<f32>) {
        self.gyro_bias.with_mut(|bias| {
            bias.x += delta.x;
            bias.y += delta.y;
        });
    }

    /// Add to the z bias axis only.
    pub fn adjust_gyro_bias_z(&self, delta: f32) {
        self.gyro_bias.with_mut(|bias| bias.z += delta);
    }

    // --- published records ---

    /// Calibrated accelerometer record
    pub fn accels(&self) -> SensorSample {
        self.accels.get()
    }

    pub fn publish_accels(&self, sample: SensorSample) {
        self.accels.set(sample);
    }

    /// Gyro record, bias-corrected when enabled
    pub fn gyros(&self) -> SensorSample {
        self.gyros.get()
    }

    pub fn publish_gyros(&self, sample: SensorSample) {
        self.gyros.set(sample);
    }

    /// Scaled gyro record before bias correction
    pub fn gyros_uncorrected(&self) -> SensorSample {
        self.gyros_uncorrected.get()
    }

    pub fn publish_gyros_uncorrected(&self, sample: SensorSample) {
        self.gyros_uncorrected.set(sample);
    }

    pub fn magnetometer(&self) -> Vector3<f32> {
        self.magnetometer.get()
    }

    pub fn publish_magnetometer(&self, field: Vector3<f32>) {
        self.magnetometer.set(field);
    }

    pub fn attitude(&self) -> AttitudeState {
        self.attitude.get()
    }

    pub fn publish_attitude(&self, state: AttitudeState) {
        self.attitude.set(state);
    }
}

impl Default for FilterContext {
    fn default() -> Self {
        Self::new()
    }
}
