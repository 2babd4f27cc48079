//! Filter configuration state.
//!
//! [`FilterConfig`] is the whole of the configuration consumed by the
//! acquisition task and the estimator. It is `Copy` so it can be swapped and
//! read as a single snapshot.

use super::rotation::{euler_to_quaternion, quaternion_to_matrix};
use nalgebra::{Matrix3, Vector3};

/// Complementary filter gains.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterGains {
    /// Proportional accel correction (per cycle, divided by dt)
    pub accel_kp: f32,
    /// Integral accel correction into the x/y gyro bias
    pub accel_ki: f32,
    /// Weak yaw-bias zeroing rate
    pub yaw_bias_rate: f32,
    /// Stabilization gyro gain, carried for consumers
    pub gyro_gain: f32,
}

impl FilterGains {
    /// Aggressive gains used while the initial bias estimate converges.
    pub const CONVERGENCE_KP: f32 = 1.0;
    pub const CONVERGENCE_KI: f32 = 0.9;
    pub const CONVERGENCE_YAW_BIAS_RATE: f32 = 0.23;

    /// Default configured gains
    pub const DEFAULT: Self = Self {
        accel_kp: 0.05,
        accel_ki: 0.0001,
        yaw_bias_rate: 0.000001,
        gyro_gain: 0.42,
    };

    /// These gains with the accel and yaw terms forced to convergence values.
    /// `gyro_gain` is left untouched.
    pub fn converging(self) -> Self {
        Self {
            accel_kp: Self::CONVERGENCE_KP,
            accel_ki: Self::CONVERGENCE_KI,
            yaw_bias_rate: Self::CONVERGENCE_YAW_BIAS_RATE,
            ..self
        }
    }
}

impl Default for FilterGains {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Accelerometer bias in raw counts, subtracted before scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CalibrationBias {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl CalibrationBias {
    pub const fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }

    pub fn as_vector(&self) -> Vector3<f32> {
        Vector3::new(self.x as f32, self.y as f32, self.z as f32)
    }
}

/// Mounting-orientation offset between sensor board and airframe.
///
/// Computed and stored on every settings change; the filter update does not
/// consume it yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardRotation {
    /// Earth-to-body style rotation matrix of the mounting offset
    pub matrix: Matrix3<f32>,
    /// False when all configured angles are exactly zero
    pub active: bool,
}

impl BoardRotation {
    pub const fn identity() -> Self {
        Self {
            matrix: Matrix3::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0),
            active: false,
        }
    }

    /// Rotation for configured roll/pitch/yaw offsets in degrees.
    ///
    /// All-zero angles take the identity path without trigonometry.
    pub fn from_degrees(roll: f32, pitch: f32, yaw: f32) -> Self {
        if roll == 0.0 && pitch == 0.0 && yaw == 0.0 {
            return Self::identity();
        }
        let q = euler_to_quaternion(roll.to_radians(), pitch.to_radians(), yaw.to_radians());
        Self {
            matrix: quaternion_to_matrix(&q),
            active: true,
        }
    }
}

impl Default for BoardRotation {
    fn default() -> Self {
        Self::identity()
    }
}

/// Complete filter configuration snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterConfig {
    pub gains: FilterGains,
    /// Add the learned gyro bias to the published gyro rates
    pub bias_correct_gyro: bool,
    /// Re-enter convergence gains while the vehicle is arming
    pub zero_during_arming: bool,
    pub accel_bias: CalibrationBias,
    pub board_rotation: BoardRotation,
}

impl FilterConfig {
    /// Configuration in effect before settings are first applied
    pub const DEFAULT: Self = Self {
        gains: FilterGains::DEFAULT,
        bias_correct_gyro: true,
        zero_during_arming: true,
        accel_bias: CalibrationBias::new(0, 0, 0),
        board_rotation: BoardRotation::identity(),
    };
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1.0e-5;

    #[test]
    fn converging_keeps_gyro_gain() {
        let gains = FilterGains {
            accel_kp: 0.1,
            accel_ki: 0.2,
            yaw_bias_rate: 0.3,
            gyro_gain: 0.7,
        }
        .converging();

        assert_eq!(gains.accel_kp, 1.0);
        assert_eq!(gains.accel_ki, 0.9);
        assert_eq!(gains.yaw_bias_rate, 0.23);
        assert_eq!(gains.gyro_gain, 0.7);
    }

    #[test]
    fn zero_board_rotation_is_inactive_identity() {
        let rot = BoardRotation::from_degrees(0.0, 0.0, 0.0);
        assert!(!rot.active);
        assert_eq!(rot.matrix, Matrix3::identity());
    }

    #[test]
    fn nonzero_board_rotation_is_active() {
        let rot = BoardRotation::from_degrees(0.0, 0.0, 90.0);
        assert!(rot.active);
        let mapped = rot.matrix * Vector3::x();
        assert!((mapped - Vector3::new(0.0, -1.0, 0.0)).norm() < EPSILON);

        // Orthonormal
        let should_be_identity = rot.matrix * rot.matrix.transpose();
        assert!((should_be_identity - Matrix3::identity()).norm() < EPSILON);
    }

    #[test]
    fn negative_zero_takes_identity_path() {
        let rot = BoardRotation::from_degrees(-0.0, 0.0, -0.0);
        assert!(!rot.active);
    }

    #[test]
    fn calibration_bias_vector() {
        let bias = CalibrationBias::new(1, -2, 3);
        assert_eq!(bias.as_vector(), Vector3::new(1.0, -2.0, 3.0));
    }
}
