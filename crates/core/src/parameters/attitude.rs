//! Attitude Estimator Parameter Definitions
//!
//! # Parameters
//!
//! - `ATT_ACC_KP` - Proportional accel correction gain
//! - `ATT_ACC_KI` - Integral accel correction gain (x/y gyro bias)
//! - `ATT_YAW_BIAS_RT` - Weak yaw-bias zeroing rate
//! - `ATT_GYRO_GAIN` - Stabilization gyro gain (carried, not used by the filter)
//! - `ATT_ZERO_ARM` - Re-enter convergence gains while arming
//! - `ATT_BIAS_GYRO` - Add the learned bias to published gyro rates
//! - `ATT_ACC_BIAS_X/Y/Z` - Accelerometer bias in raw counts
//! - `ATT_GYR_BIAS_X/Y/Z` - Initial gyro bias in centi-deg/s
//! - `ATT_BOARD_ROLL/PITCH/YAW` - Board mounting offset in degrees

use super::error::ParameterError;
use super::storage::{ParamFlags, ParamValue, ParameterStore};

const DEFAULT_ACCEL_KP: f32 = 0.05;
const DEFAULT_ACCEL_KI: f32 = 0.0001;
const DEFAULT_YAW_BIAS_RATE: f32 = 0.000001;
const DEFAULT_GYRO_GAIN: f32 = 0.42;
const DEFAULT_ZERO_DURING_ARMING: bool = true;
const DEFAULT_BIAS_CORRECT_GYRO: bool = true;

/// Board rotation angles are limited to one turn either way
const MAX_BOARD_ROTATION_DEG: f32 = 360.0;

const ACCEL_BIAS_NAMES: [&str; 3] = ["ATT_ACC_BIAS_X", "ATT_ACC_BIAS_Y", "ATT_ACC_BIAS_Z"];
const GYRO_BIAS_NAMES: [&str; 3] = ["ATT_GYR_BIAS_X", "ATT_GYR_BIAS_Y", "ATT_GYR_BIAS_Z"];
const BOARD_ROTATION_NAMES: [&str; 3] = ["ATT_BOARD_ROLL", "ATT_BOARD_PITCH", "ATT_BOARD_YAW"];

/// Attitude settings loaded from the parameter store
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttitudeSettings {
    pub accel_kp: f32,
    pub accel_ki: f32,
    pub yaw_bias_rate: f32,
    pub gyro_gain: f32,
    pub zero_during_arming: bool,
    pub bias_correct_gyro: bool,
    /// Raw accelerometer counts per axis
    pub accel_bias: [i16; 3],
    /// Gyro bias in hundredths of deg/s per axis
    pub gyro_bias_centi: [i16; 3],
    /// Roll, pitch, yaw mounting offset in degrees
    pub board_rotation_deg: [f32; 3],
}

impl Default for AttitudeSettings {
    fn default() -> Self {
        Self {
            accel_kp: DEFAULT_ACCEL_KP,
            accel_ki: DEFAULT_ACCEL_KI,
            yaw_bias_rate: DEFAULT_YAW_BIAS_RATE,
            gyro_gain: DEFAULT_GYRO_GAIN,
            zero_during_arming: DEFAULT_ZERO_DURING_ARMING,
            bias_correct_gyro: DEFAULT_BIAS_CORRECT_GYRO,
            accel_bias: [0; 3],
            gyro_bias_centi: [0; 3],
            board_rotation_deg: [0.0; 3],
        }
    }
}

fn read_f32(store: &ParameterStore, name: &str, default: f32) -> f32 {
    store
        .get(name)
        .and_then(ParamValue::as_f32)
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

fn read_bool(store: &ParameterStore, name: &str, default: bool) -> bool {
    store
        .get(name)
        .and_then(ParamValue::as_bool)
        .unwrap_or(default)
}

fn read_i16(store: &ParameterStore, name: &str) -> i16 {
    store
        .get(name)
        .and_then(ParamValue::as_i32)
        .map(|v| v.clamp(i16::MIN as i32, i16::MAX as i32) as i16)
        .unwrap_or(0)
}

impl AttitudeSettings {
    /// Register attitude parameters with default values
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        store.register(
            "ATT_ACC_KP",
            ParamValue::Float(DEFAULT_ACCEL_KP),
            ParamFlags::empty(),
        )?;
        store.register(
            "ATT_ACC_KI",
            ParamValue::Float(DEFAULT_ACCEL_KI),
            ParamFlags::empty(),
        )?;
        store.register(
            "ATT_YAW_BIAS_RT",
            ParamValue::Float(DEFAULT_YAW_BIAS_RATE),
            ParamFlags::empty(),
        )?;
        store.register(
            "ATT_GYRO_GAIN",
            ParamValue::Float(DEFAULT_GYRO_GAIN),
            ParamFlags::empty(),
        )?;
        store.register(
            "ATT_ZERO_ARM",
            ParamValue::Bool(DEFAULT_ZERO_DURING_ARMING),
            ParamFlags::empty(),
        )?;
        store.register(
            "ATT_BIAS_GYRO",
            ParamValue::Bool(DEFAULT_BIAS_CORRECT_GYRO),
            ParamFlags::empty(),
        )?;

        for name in ACCEL_BIAS_NAMES.iter().chain(GYRO_BIAS_NAMES.iter()) {
            store.register(name, ParamValue::Int(0), ParamFlags::empty())?;
        }
        for name in BOARD_ROTATION_NAMES {
            store.register(name, ParamValue::Float(0.0), ParamFlags::empty())?;
        }

        Ok(())
    }

    /// Load attitude settings from parameter store
    ///
    /// Missing or non-finite values fall back to defaults; integer values
    /// saturate to the i16 range; board angles clamp to ±360°.
    pub fn from_store(store: &ParameterStore) -> Self {
        let board_rotation_deg = BOARD_ROTATION_NAMES.map(|name| {
            read_f32(store, name, 0.0).clamp(-MAX_BOARD_ROTATION_DEG, MAX_BOARD_ROTATION_DEG)
        });

        Self {
            accel_kp: read_f32(store, "ATT_ACC_KP", DEFAULT_ACCEL_KP),
            accel_ki: read_f32(store, "ATT_ACC_KI", DEFAULT_ACCEL_KI),
            yaw_bias_rate: read_f32(store, "ATT_YAW_BIAS_RT", DEFAULT_YAW_BIAS_RATE),
            gyro_gain: read_f32(store, "ATT_GYRO_GAIN", DEFAULT_GYRO_GAIN),
            zero_during_arming: read_bool(store, "ATT_ZERO_ARM", DEFAULT_ZERO_DURING_ARMING),
            bias_correct_gyro: read_bool(store, "ATT_BIAS_GYRO", DEFAULT_BIAS_CORRECT_GYRO),
            accel_bias: ACCEL_BIAS_NAMES.map(|name| read_i16(store, name)),
            gyro_bias_centi: GYRO_BIAS_NAMES.map(|name| read_i16(store, name)),
            board_rotation_deg,
        }
    }
}
