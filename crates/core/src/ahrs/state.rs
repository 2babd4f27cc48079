//! Published attitude estimate.

use super::rotation::quaternion_to_euler;
use nalgebra::Quaternion;

/// Tolerance on `‖q‖ - 1` for a published estimate
pub const UNIT_NORM_TOLERANCE: f32 = 1.0e-6;

/// Attitude estimate: unit quaternion plus its Euler projection.
///
/// # Coordinate System
///
/// - Quaternion: scalar-first (w, x, y, z), rotation from earth frame to body
///   frame, kept in the `w >= 0` hemisphere
/// - Euler sequence: ZYX (yaw-pitch-roll), radians
///
/// Euler angles are stored in radians. Telemetry and ground-station
/// records carry degrees; the consumer converts with [`roll_deg`],
/// [`pitch_deg`] and [`yaw_deg`] when it builds them.
///
/// [`roll_deg`]: Self::roll_deg
/// [`pitch_deg`]: Self::pitch_deg
/// [`yaw_deg`]: Self::yaw_deg
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttitudeState {
    pub quaternion: Quaternion<f32>,

    /// Roll angle in radians
    pub roll: f32,

    /// Pitch angle in radians
    pub pitch: f32,

    /// Yaw angle in radians
    pub yaw: f32,

    /// Time of the estimator cycle that produced this state (µs since boot)
    pub timestamp_us: u64,
}

impl Default for AttitudeState {
    fn default() -> Self {
        Self::identity()
    }
}

impl AttitudeState {
    /// Level attitude at boot, usable in `static` initializers
    pub const fn identity() -> Self {
        Self {
            quaternion: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            roll: 0.0,
            pitch: 0.0,
            yaw: 0.0,
            timestamp_us: 0,
        }
    }

    /// Build a state from a unit quaternion, deriving the Euler angles.
    pub fn from_quaternion(q: Quaternion<f32>, timestamp_us: u64) -> Self {
        let (roll, pitch, yaw) = quaternion_to_euler(&q);
        Self {
            quaternion: q,
            roll,
            pitch,
            yaw,
            timestamp_us,
        }
    }

    /// `‖q‖` within [`UNIT_NORM_TOLERANCE`] of 1 and `w >= 0`.
    pub fn is_canonical(&self) -> bool {
        let err = self.quaternion.norm() - 1.0;
        err < UNIT_NORM_TOLERANCE && err > -UNIT_NORM_TOLERANCE && self.quaternion.w >= 0.0
    }

    pub fn roll_deg(&self) -> f32 {
        self.roll.to_degrees()
    }

    pub fn pitch_deg(&self) -> f32 {
        self.pitch.to_degrees()
    }

    pub fn yaw_deg(&self) -> f32 {
        self.yaw.to_degrees()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::{FRAC_1_SQRT_2, PI};

    const EPSILON: f32 = 0.001;

    #[test]
    fn default_is_identity() {
        let state = AttitudeState::default();
        assert_eq!(state.quaternion, Quaternion::identity());
        assert_eq!(state.roll, 0.0);
        assert!(state.is_canonical());
    }

    #[test]
    fn from_quaternion_known_angles() {
        let roll_90 = Quaternion::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2, 0.0, 0.0);
        let state = AttitudeState::from_quaternion(roll_90, 10);
        assert!((state.roll - PI / 2.0).abs() < EPSILON);
        assert!(state.pitch.abs() < EPSILON);
        assert!(state.yaw.abs() < EPSILON);
        assert_eq!(state.timestamp_us, 10);

        let yaw_90 = Quaternion::new(FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2);
        let state = AttitudeState::from_quaternion(yaw_90, 0);
        assert!((state.yaw_deg() - 90.0).abs() < 0.01);
    }

    #[test]
    fn degree_accessors_convert_stored_radians() {
        let state = AttitudeState {
            roll: PI / 6.0,
            pitch: -PI / 4.0,
            yaw: PI,
            ..Default::default()
        };
        assert!((state.roll_deg() - 30.0).abs() < 1.0e-4);
        assert!((state.pitch_deg() + 45.0).abs() < 1.0e-4);
        assert!((state.yaw_deg() - 180.0).abs() < 1.0e-4);
    }

    #[test]
    fn canonical_rejects_wrong_hemisphere_and_norm() {
        let flipped = AttitudeState {
            quaternion: Quaternion::new(-1.0, 0.0, 0.0, 0.0),
            ..Default::default()
        };
        assert!(!flipped.is_canonical());

        let long = AttitudeState {
            quaternion: Quaternion::new(1.01, 0.0, 0.0, 0.0),
            ..Default::default()
        };
        assert!(!long.is_canonical());
    }
}
