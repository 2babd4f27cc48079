//! Complementary attitude filter.
//!
//! Fuses gyro integration (high frequency, drifts) with the accelerometer's
//! gravity direction (low frequency, noisy) through fixed-gain feedback:
//!
//! 1. Predict body-frame gravity from the current quaternion.
//! 2. Tilt error = normalized accel × predicted gravity.
//! 3. Integral term: `error.xy * Ki` is returned as a gyro-bias increment.
//! 4. Proportional term: `error * Kp / dt` is added to this cycle's rates.
//! 5. Integrate `q̇ = ½ q ⊗ (0, ω)` with an Euler step.
//! 6. Flip into the `w >= 0` hemisphere and renormalize, or reset to
//!    identity if the norm has collapsed or gone non-finite.
//!
//! Rates are in deg/s throughout; conversion to rad/s happens only inside
//! the kinematics step.

use super::config::FilterGains;
use super::rotation::{canonical, predicted_gravity};
use nalgebra::{Quaternion, Vector3};

/// Below this norm the quaternion is considered collapsed.
pub const MIN_QUATERNION_NORM: f32 = 1.0e-3;

/// Accelerometer magnitudes below this carry no usable tilt information.
pub const MIN_ACCEL_NORM: f32 = 1.0e-6;

/// Smallest time step used for the proportional term and integration (s).
pub const MIN_DT_S: f32 = 1.0e-6;

/// Result of the post-integration invariant guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Quaternion renormalized as usual
    Normal,
    /// Norm was below [`MIN_QUATERNION_NORM`] or not finite; reset to identity
    Degenerate,
}

/// Everything one filter update produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterStep {
    pub quaternion: Quaternion<f32>,
    pub outcome: UpdateOutcome,
    /// Normalized tilt error this cycle
    pub accel_error: Vector3<f32>,
    /// Increment for the persistent gyro bias (z is always zero)
    pub bias_increment: Vector3<f32>,
    /// Rates actually integrated (deg/s)
    pub corrected_rate: Vector3<f32>,
}

/// Tilt error between measured and predicted gravity, scaled by 1/‖accel‖.
///
/// Approximately twice the sine of the misalignment angle about the error
/// axis. A zero or non-finite accelerometer reading yields no correction.
pub fn tilt_error(accel: &Vector3<f32>, q: &Quaternion<f32>) -> Vector3<f32> {
    let magnitude = accel.norm();
    if !magnitude.is_finite() || magnitude < MIN_ACCEL_NORM {
        return Vector3::zeros();
    }
    accel.cross(&predicted_gravity(q)) / magnitude
}

/// Complementary filter holding the running attitude quaternion.
#[derive(Debug, Clone, Copy)]
pub struct ComplementaryFilter {
    q: Quaternion<f32>,
}

impl Default for ComplementaryFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl ComplementaryFilter {
    /// Filter starting at the identity attitude.
    pub fn new() -> Self {
        Self {
            q: Quaternion::identity(),
        }
    }

    /// Filter starting at `q`; the quaternion is used as given.
    pub fn with_quaternion(q: Quaternion<f32>) -> Self {
        Self { q }
    }

    pub fn quaternion(&self) -> Quaternion<f32> {
        self.q
    }

    pub fn reset(&mut self) {
        self.q = Quaternion::identity();
    }

    /// Run one filter cycle.
    ///
    /// `gyro` is in deg/s (without bias correction), `accel` in any
    /// consistent unit, `dt` in seconds since the previous successful cycle.
    pub fn update(
        &mut self,
        gyro: Vector3<f32>,
        accel: Vector3<f32>,
        gains: &FilterGains,
        dt: f32,
    ) -> FilterStep {
        let dt = if dt.is_finite() { dt.max(MIN_DT_S) } else { MIN_DT_S };

        let accel_error = tilt_error(&accel, &self.q);
        let bias_increment = Vector3::new(
            accel_error.x * gains.accel_ki,
            accel_error.y * gains.accel_ki,
            0.0,
        );
        let corrected_rate = gyro + accel_error * (gains.accel_kp / dt);

        let omega = corrected_rate.map(|r| r.to_radians());
        let q_dot = self.q * Quaternion::from_imag(omega) * 0.5;
        let q = canonical(self.q + q_dot * dt);

        let norm = q.norm();
        let (q, outcome) = if !norm.is_finite() || norm < MIN_QUATERNION_NORM {
            (Quaternion::identity(), UpdateOutcome::Degenerate)
        } else {
            (q / norm, UpdateOutcome::Normal)
        };
        self.q = q;

        FilterStep {
            quaternion: q,
            outcome,
            accel_error,
            bias_increment,
            corrected_rate,
        }
    }
}
