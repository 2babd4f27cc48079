//! Settings-to-configuration recomputation.
//!
//! Turns one [`AttitudeSettings`] read into everything the settings reactor
//! writes: the full [`FilterConfig`] snapshot and the initial gyro bias.

use super::config::{BoardRotation, CalibrationBias, FilterConfig, FilterGains};
use crate::parameters::AttitudeSettings;
use nalgebra::Vector3;

/// Divisor from stored centi-units to gyro bias units.
pub const GYRO_BIAS_SCALE: f32 = 100.0;

/// Everything a settings application produces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettingsUpdate {
    pub config: FilterConfig,
    /// Gyro bias to install (deg/s)
    pub gyro_bias: Vector3<f32>,
}

/// Recompute configuration state from settings.
pub fn apply_settings(settings: &AttitudeSettings) -> SettingsUpdate {
    let [bx, by, bz] = settings.accel_bias;
    let [roll, pitch, yaw] = settings.board_rotation_deg;
    let [gx, gy, gz] = settings.gyro_bias_centi;

    let config = FilterConfig {
        gains: FilterGains {
            accel_kp: settings.accel_kp,
            accel_ki: settings.accel_ki,
            yaw_bias_rate: settings.yaw_bias_rate,
            gyro_gain: settings.gyro_gain,
        },
        bias_correct_gyro: settings.bias_correct_gyro,
        zero_during_arming: settings.zero_during_arming,
        accel_bias: CalibrationBias::new(bx, by, bz),
        board_rotation: BoardRotation::from_degrees(roll, pitch, yaw),
    };

    SettingsUpdate {
        config,
        gyro_bias: Vector3::new(gx as f32, gy as f32, gz as f32) / GYRO_BIAS_SCALE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1.0e-6;

    #[test]
    fn default_settings_give_default_config() {
        let update = apply_settings(&AttitudeSettings::default());
        assert_eq!(update.config, FilterConfig::default());
        assert_eq!(update.gyro_bias, Vector3::zeros());
        assert!(!update.config.board_rotation.active);
    }

    #[test]
    fn gyro_bias_is_scaled_from_centi_units() {
        let settings = AttitudeSettings {
            gyro_bias_centi: [150, -25, 3],
            ..Default::default()
        };
        let update = apply_settings(&settings);
        assert!((update.gyro_bias - Vector3::new(1.5, -0.25, 0.03)).norm() < EPSILON);
    }

    #[test]
    fn all_fields_are_carried() {
        let settings = AttitudeSettings {
            accel_kp: 0.3,
            accel_ki: 0.01,
            yaw_bias_rate: 0.002,
            gyro_gain: 0.9,
            zero_during_arming: false,
            bias_correct_gyro: false,
            accel_bias: [4, 5, -6],
            gyro_bias_centi: [0; 3],
            board_rotation_deg: [0.0, 0.0, 45.0],
        };
        let config = apply_settings(&settings).config;

        assert_eq!(config.gains.accel_kp, 0.3);
        assert_eq!(config.gains.accel_ki, 0.01);
        assert_eq!(config.gains.yaw_bias_rate, 0.002);
        assert_eq!(config.gains.gyro_gain, 0.9);
        assert!(!config.zero_during_arming);
        assert!(!config.bias_correct_gyro);
        assert_eq!(config.accel_bias, CalibrationBias::new(4, 5, -6));
        assert!(config.board_rotation.active);
        assert_eq!(config.board_rotation, BoardRotation::from_degrees(0.0, 0.0, 45.0));
    }
}
