//! Quaternion, Euler and rotation-matrix conversions.
//!
//! Conventions: quaternions are scalar-first and rotate earth frame into body
//! frame; Euler angles are ZYX (yaw, then pitch, then roll); rotation matrices
//! map earth-frame vectors into body frame.

use nalgebra::{Matrix3, Quaternion, UnitQuaternion, Vector3};

/// Euler angles `(roll, pitch, yaw)` in radians (ZYX).
pub fn quaternion_to_euler(q: &Quaternion<f32>) -> (f32, f32, f32) {
    UnitQuaternion::from_quaternion(*q).euler_angles()
}

/// Quaternion for ZYX Euler angles in radians, in the `w >= 0` hemisphere.
pub fn euler_to_quaternion(roll: f32, pitch: f32, yaw: f32) -> Quaternion<f32> {
    canonical(*UnitQuaternion::from_euler_angles(roll, pitch, yaw).quaternion())
}

/// Earth-to-body rotation matrix for a unit quaternion.
pub fn quaternion_to_matrix(q: &Quaternion<f32>) -> Matrix3<f32> {
    UnitQuaternion::from_quaternion(*q)
        .to_rotation_matrix()
        .into_inner()
        .transpose()
}

/// Flip `q` into the `w >= 0` hemisphere. `q` and `-q` are the same rotation.
#[inline]
pub fn canonical(q: Quaternion<f32>) -> Quaternion<f32> {
    if q.w < 0.0 {
        -q
    } else {
        q
    }
}

/// Expected gravity reaction direction in body frame for attitude `q`.
///
/// Third column of the earth-to-body matrix, negated: a level vehicle
/// predicts `(0, 0, -1)`, which is what a calibrated accelerometer reads at
/// rest in this frame.
#[inline]
pub fn predicted_gravity(q: &Quaternion<f32>) -> Vector3<f32> {
    let (q0, q1, q2, q3) = (q.w, q.i, q.j, q.k);
    Vector3::new(
        -2.0 * (q1 * q3 - q0 * q2),
        -2.0 * (q2 * q3 + q0 * q1),
        -(q0 * q0 - q1 * q1 - q2 * q2 + q3 * q3),
    )
}
