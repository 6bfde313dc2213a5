use glam::{DMat3, DQuat, DVec3};

use crate::math::{
    PsiThetaPhi, euler_to_quaternion, euler_to_rotation_matrix, outer_product,
    quaternion_to_euler, rotation_matrix_to_euler, skew_matrix,
};

/// Below this rate (0.2 degrees per 5 seconds) the body frame integrals fall
/// back to their first order expansion.
pub const MIN_ROTATION_RATE: f64 = 0.2 * std::f64::consts::PI / 180.0 / 5.0;

/// Magnitude substituted for a zero angular velocity so the rotation stays finite.
const ZERO_RATE_SUBSTITUTE: f64 = 1e-5;

/// `p + v dt + a dt^2 / 2`
pub fn world_position(position: DVec3, velocity: DVec3, acceleration: DVec3, dt: f64) -> DVec3 {
    position + velocity * dt + acceleration * (0.5 * dt * dt)
}

/// Closed form integrals of the body rotation over `dt`. `r1` maps body
/// velocity to displacement, `r2` maps body acceleration to displacement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyIntegrals {
    pub r1: DMat3,
    pub r2: DMat3,
}

impl BodyIntegrals {
    pub fn new(angular_velocity: DVec3, dt: f64) -> Self {
        let w = angular_velocity.length();
        if w < MIN_ROTATION_RATE {
            return Self {
                r1: DMat3::IDENTITY * dt,
                r2: DMat3::IDENTITY * (0.5 * dt * dt),
            };
        }

        let omega = outer_product(angular_velocity);
        let skew = skew_matrix(angular_velocity);
        let wt = w * dt;
        let (sin, cos) = wt.sin_cos();
        let (w2, w3, w4) = (w * w, w * w * w, w * w * w * w);

        let r1 = omega * ((wt - sin) / w3) + DMat3::IDENTITY * (sin / w) + skew * ((1.0 - cos) / w2);
        let r2 = omega * ((0.5 * wt * wt - cos - wt * sin + 1.0) / w4)
            + DMat3::IDENTITY * ((cos + wt * sin - 1.0) / w2)
            + skew * ((sin - wt * cos) / w3);

        Self { r1, r2 }
    }
}

/// Extrapolates a position from body frame velocity and acceleration.
///
/// `angular_velocity` is the body rate that bends the path. When it is
/// non-zero and `include_acceleration` is set, the acceleration term uses the
/// body acceleration with the centripetal part removed.
pub fn body_position(
    position: DVec3,
    orientation: PsiThetaPhi,
    body_velocity: DVec3,
    body_acceleration: DVec3,
    angular_velocity: DVec3,
    include_acceleration: bool,
    dt: f64,
) -> DVec3 {
    let integrals = BodyIntegrals::new(angular_velocity, dt);
    let body_to_world = euler_to_rotation_matrix(orientation).transpose();

    let mut displacement = integrals.r1 * body_velocity;
    if include_acceleration {
        let acceleration = body_acceleration - angular_velocity.cross(body_velocity);
        displacement += integrals.r2 * acceleration;
    }
    position + body_to_world * displacement
}

fn substitute_zero_rate(angular_velocity: DVec3) -> (DVec3, f64) {
    let w = angular_velocity.length();
    if w == 0.0 {
        (
            angular_velocity + DVec3::splat(ZERO_RATE_SUBSTITUTE),
            ZERO_RATE_SUBSTITUTE,
        )
    } else {
        (angular_velocity, w)
    }
}

/// Incremental world to body rotation for a constant body rate over `dt`.
pub fn rotation_matrix(angular_velocity: DVec3, dt: f64) -> DMat3 {
    let (angular_velocity, w) = substitute_zero_rate(angular_velocity);
    let (sin, cos) = (w * dt).sin_cos();

    outer_product(angular_velocity) * ((1.0 - cos) / (w * w)) + DMat3::IDENTITY * cos
        - skew_matrix(angular_velocity) * (sin / w)
}

/// Quaternion form of [`rotation_matrix`], to be applied on the right of a
/// body to world orientation.
pub fn rotation_quaternion(angular_velocity: DVec3, dt: f64) -> DQuat {
    let (angular_velocity, w) = substitute_zero_rate(angular_velocity);
    let axis = angular_velocity / w;
    let (sin, cos) = (0.5 * w * dt).sin_cos();
    DQuat::from_xyzw(axis.x * sin, axis.y * sin, axis.z * sin, cos)
}

/// Rotates `orientation` by the body rate using the rotation matrix form.
pub fn rotate_orientation(orientation: PsiThetaPhi, angular_velocity: DVec3, dt: f64) -> PsiThetaPhi {
    let rotated = rotation_matrix(angular_velocity, dt) * euler_to_rotation_matrix(orientation);
    rotation_matrix_to_euler(rotated)
}

/// Rotates a body to world quaternion by the body rate, `q * q_delta`.
pub fn rotate_quaternion(orientation: DQuat, angular_velocity: DVec3, dt: f64) -> PsiThetaPhi {
    quaternion_to_euler(orientation * rotation_quaternion(angular_velocity, dt))
}

/// Quaternion path starting from Euler angles; agrees with [`rotate_orientation`].
pub fn rotate_orientation_quaternion(
    orientation: PsiThetaPhi,
    angular_velocity: DVec3,
    dt: f64,
) -> PsiThetaPhi {
    rotate_quaternion(euler_to_quaternion(orientation), angular_velocity, dt)
}
