use std::f64::consts::FRAC_PI_2;

use glam::{DMat3, DQuat, DVec3, Vec3};
use serde::{Deserialize, Serialize};

/// Cosine substituted for cos(theta) when theta sits exactly on +/- pi/2.
/// An approximation that keeps the extraction finite, not an exact branch.
pub const GIMBAL_LOCK_COSINE: f64 = 1e-5;

/// World (ECEF) referenced Euler angles as carried by DIS, in radians.
/// Psi is the yaw about Z, theta the pitch about Y, phi the roll about X.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PsiThetaPhi {
    pub psi: f64,
    pub theta: f64,
    pub phi: f64,
}

impl PsiThetaPhi {
    pub fn new(psi: f64, theta: f64, phi: f64) -> Self {
        Self { psi, theta, phi }
    }

    pub fn from_degrees(psi: f64, theta: f64, phi: f64) -> Self {
        Self::new(psi.to_radians(), theta.to_radians(), phi.to_radians())
    }

    pub fn to_degrees(self) -> Self {
        Self::new(
            self.psi.to_degrees(),
            self.theta.to_degrees(),
            self.phi.to_degrees(),
        )
    }

    /// Wire orientation order is psi, theta, phi.
    pub fn from_wire(orientation: Vec3) -> Self {
        Self::new(
            orientation.x as f64,
            orientation.y as f64,
            orientation.z as f64,
        )
    }

    pub fn to_wire(self) -> Vec3 {
        Vec3::new(self.psi as f32, self.theta as f32, self.phi as f32)
    }
}

/// Cross product matrix of `n`: `skew_matrix(n) * v == n.cross(v)`.
pub fn skew_matrix(n: DVec3) -> DMat3 {
    DMat3::from_cols(
        DVec3::new(0.0, n.z, -n.y),
        DVec3::new(-n.z, 0.0, n.x),
        DVec3::new(n.y, -n.x, 0.0),
    )
}

/// `n * n^T`
pub fn outer_product(n: DVec3) -> DMat3 {
    DMat3::from_cols(n * n.x, n * n.y, n * n.z)
}

/// Rodrigues rotation matrix for a unit `axis`:
/// `(1 - cos) n n^T + cos I + sin N^x`.
pub fn axis_angle_matrix(axis: DVec3, theta_radians: f64) -> DMat3 {
    let (sin, cos) = theta_radians.sin_cos();
    outer_product(axis) * (1.0 - cos) + DMat3::IDENTITY * cos + skew_matrix(axis) * sin
}

pub fn rotate_vector_by_axis_angle(v: DVec3, theta_radians: f64, axis: DVec3) -> DVec3 {
    axis_angle_matrix(axis, theta_radians) * v
}

pub fn rotate_vector_by_axis_angle_degrees(v: DVec3, theta_degrees: f64, axis: DVec3) -> DVec3 {
    rotate_vector_by_axis_angle(v, theta_degrees.to_radians(), axis)
}

/// World to body rotation matrix, `R = Roll * Pitch * Heading`.
pub fn euler_to_rotation_matrix(ptp: PsiThetaPhi) -> DMat3 {
    let (sin_psi, cos_psi) = ptp.psi.sin_cos();
    let (sin_theta, cos_theta) = ptp.theta.sin_cos();
    let (sin_phi, cos_phi) = ptp.phi.sin_cos();

    DMat3::from_cols(
        DVec3::new(
            cos_theta * cos_psi,
            sin_phi * sin_theta * cos_psi - cos_phi * sin_psi,
            cos_phi * sin_theta * cos_psi + sin_phi * sin_psi,
        ),
        DVec3::new(
            cos_theta * sin_psi,
            sin_phi * sin_theta * sin_psi + cos_phi * cos_psi,
            cos_phi * sin_theta * sin_psi - sin_phi * cos_psi,
        ),
        DVec3::new(-sin_theta, sin_phi * cos_theta, cos_phi * cos_theta),
    )
}

/// Inverse of [`euler_to_rotation_matrix`]. At gimbal lock the cosine of theta is
/// replaced by [`GIMBAL_LOCK_COSINE`].
pub fn rotation_matrix_to_euler(m: DMat3) -> PsiThetaPhi {
    let r0 = m.row(0);
    let r1 = m.row(1);
    let r2 = m.row(2);

    let theta = (-r0.z).clamp(-1.0, 1.0).asin();
    let cos_theta = if theta.abs() == FRAC_PI_2 {
        GIMBAL_LOCK_COSINE
    } else {
        theta.cos()
    };

    PsiThetaPhi {
        psi: (r0.y / cos_theta).atan2(r0.x / cos_theta),
        theta,
        phi: (r1.z / cos_theta).atan2(r2.z / cos_theta),
    }
}

/// Z-Y-X body to world quaternion.
pub fn euler_to_quaternion(ptp: PsiThetaPhi) -> DQuat {
    let (sy, cy) = (ptp.psi * 0.5).sin_cos();
    let (sp, cp) = (ptp.theta * 0.5).sin_cos();
    let (sr, cr) = (ptp.phi * 0.5).sin_cos();

    DQuat::from_xyzw(
        sr * cp * cy - cr * sp * sy,
        cr * sp * cy + sr * cp * sy,
        cr * cp * sy - sr * sp * cy,
        cr * cp * cy + sr * sp * sy,
    )
}

/// Inverse of [`euler_to_quaternion`]. Gimbal lock is handled as in
/// [`rotation_matrix_to_euler`].
pub fn quaternion_to_euler(q: DQuat) -> PsiThetaPhi {
    let (w, x, y, z) = (q.w, q.x, q.y, q.z);

    let theta = (-2.0 * (x * z - w * y)).clamp(-1.0, 1.0).asin();
    let cos_theta = if theta.abs() == FRAC_PI_2 {
        GIMBAL_LOCK_COSINE
    } else {
        theta.cos()
    };

    let psi = (2.0 * (x * y + w * z) / cos_theta).atan2((w * w + x * x - y * y - z * z) / cos_theta);
    let phi = (2.0 * (y * z + w * x) / cos_theta).atan2((w * w - x * x - y * y + z * z) / cos_theta);

    PsiThetaPhi { psi, theta, phi }
}

/// Signed rotation taking `old` to `new`, both world referenced.
pub fn directional_rotation_difference(old: PsiThetaPhi, new: PsiThetaPhi) -> PsiThetaPhi {
    let old = euler_to_quaternion(old).normalize();
    let new = euler_to_quaternion(new).normalize();
    quaternion_to_euler(new * old.inverse())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec_eq(a: DVec3, b: DVec3, eps: f64) {
        assert!((a - b).length() < eps, "{:?} != {:?}", a, b);
    }

    fn assert_ptp_eq(a: PsiThetaPhi, b: PsiThetaPhi, eps: f64) {
        assert!((a.psi - b.psi).abs() < eps, "{:?} != {:?}", a, b);
        assert!((a.theta - b.theta).abs() < eps, "{:?} != {:?}", a, b);
        assert!((a.phi - b.phi).abs() < eps, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_skew_matrix_is_cross_product() {
        let n = DVec3::new(1.0, -2.0, 3.0);
        let v = DVec3::new(-0.5, 4.0, 2.0);
        assert_vec_eq(skew_matrix(n) * v, n.cross(v), 1e-12);
    }

    #[test]
    fn test_rotate_about_z() {
        let rotated = rotate_vector_by_axis_angle_degrees(DVec3::X, 90.0, DVec3::Z);
        assert_vec_eq(rotated, DVec3::Y, 1e-12);
    }

    #[test]
    fn test_matrix_round_trip() {
        let ptp = PsiThetaPhi::new(0.3, -0.2, 0.5);
        assert_ptp_eq(rotation_matrix_to_euler(euler_to_rotation_matrix(ptp)), ptp, 1e-12);
    }

    #[test]
    fn test_quaternion_round_trip() {
        let ptp = PsiThetaPhi::new(-2.1, 0.7, 3.0);
        assert_ptp_eq(quaternion_to_euler(euler_to_quaternion(ptp)), ptp, 1e-12);
    }

    #[test]
    fn test_quaternion_matches_matrix() {
        let ptp = PsiThetaPhi::new(1.1, 0.4, -0.9);
        let body_to_world = DMat3::from_quat(euler_to_quaternion(ptp));
        let world_to_body = euler_to_rotation_matrix(ptp);
        let diff = body_to_world - world_to_body.transpose();
        for col in [diff.x_axis, diff.y_axis, diff.z_axis] {
            assert!(col.length() < 1e-12);
        }
    }

    #[test]
    fn test_gimbal_lock_stays_finite() {
        let m = euler_to_rotation_matrix(PsiThetaPhi::new(0.0, FRAC_PI_2, 0.0));
        let ptp = rotation_matrix_to_euler(m);
        assert!(ptp.psi.is_finite());
        assert!(ptp.phi.is_finite());
        assert!((ptp.theta - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_quaternion_gimbal_lock_keeps_pitch() {
        for pitch in [FRAC_PI_2, -FRAC_PI_2] {
            let ptp = quaternion_to_euler(euler_to_quaternion(PsiThetaPhi::new(0.0, pitch, 0.0)));
            assert!(ptp.psi.is_finite());
            assert!(ptp.phi.is_finite());
            assert!((ptp.theta - pitch).abs() < 1e-6, "pitch {} came back as {}", pitch, ptp.theta);
        }
    }

    #[test]
    fn test_directional_rotation_difference() {
        let old = PsiThetaPhi::new(0.2, 0.0, 0.0);
        let new = PsiThetaPhi::new(0.5, 0.0, 0.0);
        let diff = directional_rotation_difference(old, new);
        assert!((diff.psi - 0.3).abs() < 1e-12);
        assert!(diff.theta.abs() < 1e-12);
        assert!(diff.phi.abs() < 1e-12);
    }
}
