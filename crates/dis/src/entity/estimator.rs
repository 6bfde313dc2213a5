use glam::{DQuat, DVec3};

use crate::math::{PsiThetaPhi, euler_to_quaternion, euler_to_rotation_matrix};

#[derive(Debug, Clone, Copy)]
struct PoseSample {
    location: DVec3,
    rotation: DQuat,
}

/// Derives the rates a dead reckoning record needs from successive pose samples.
///
/// Locations are ECEF metres, orientations world referenced psi/theta/phi.
/// Angular velocity is in body axes. Body acceleration includes the
/// centripetal term `w x v`.
#[derive(Debug, Clone, Default)]
pub struct KinematicsEstimator {
    last: Option<PoseSample>,
    world_velocity: DVec3,
    world_acceleration: DVec3,
    body_velocity: DVec3,
    body_acceleration: DVec3,
    angular_velocity: DVec3,
}

impl KinematicsEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a sample taken `dt` seconds after the previous one. A zero or
    /// negative `dt` only moves the reference pose and keeps the old rates.
    pub fn sample(&mut self, location: DVec3, orientation: PsiThetaPhi, dt: f64) {
        let rotation = euler_to_quaternion(orientation).normalize();
        let current = PoseSample { location, rotation };

        let Some(previous) = self.last.replace(current) else {
            return;
        };
        if dt <= 0.0 {
            return;
        }

        let mut delta = previous.rotation.inverse() * rotation;
        if delta.w < 0.0 {
            delta = -delta;
        }
        let (axis, angle) = delta.to_axis_angle();
        self.angular_velocity = axis * (angle / dt);

        let world_velocity = (location - previous.location) / dt;
        self.world_acceleration = (world_velocity - self.world_velocity) / dt;
        self.world_velocity = world_velocity;

        let body_velocity = euler_to_rotation_matrix(orientation) * world_velocity;
        self.body_acceleration = (body_velocity - self.body_velocity) / dt
            + self.angular_velocity.cross(body_velocity);
        self.body_velocity = body_velocity;
    }

    pub fn world_velocity(&self) -> DVec3 {
        self.world_velocity
    }

    pub fn world_acceleration(&self) -> DVec3 {
        self.world_acceleration
    }

    pub fn body_velocity(&self) -> DVec3 {
        self.body_velocity
    }

    pub fn body_acceleration(&self) -> DVec3 {
        self.body_acceleration
    }

    pub fn angular_velocity(&self) -> DVec3 {
        self.angular_velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec_eq(a: DVec3, b: DVec3, eps: f64) {
        assert!((a - b).length() < eps, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_constant_velocity() {
        let mut estimator = KinematicsEstimator::new();
        let orientation = PsiThetaPhi::default();
        estimator.sample(DVec3::ZERO, orientation, 0.0);
        estimator.sample(DVec3::new(1.0, 0.0, 0.0), orientation, 0.1);
        estimator.sample(DVec3::new(2.0, 0.0, 0.0), orientation, 0.1);

        assert_vec_eq(estimator.world_velocity(), DVec3::new(10.0, 0.0, 0.0), 1e-9);
        assert_vec_eq(estimator.world_acceleration(), DVec3::ZERO, 1e-9);
        assert_vec_eq(estimator.body_velocity(), DVec3::new(10.0, 0.0, 0.0), 1e-9);
        assert_vec_eq(estimator.angular_velocity(), DVec3::ZERO, 1e-9);
    }

    #[test]
    fn test_body_velocity_follows_heading() {
        let mut estimator = KinematicsEstimator::new();
        let east = PsiThetaPhi::from_degrees(90.0, 0.0, 0.0);
        estimator.sample(DVec3::ZERO, east, 0.0);
        estimator.sample(DVec3::new(0.0, 1.0, 0.0), east, 0.1);

        assert_vec_eq(estimator.body_velocity(), DVec3::new(10.0, 0.0, 0.0), 1e-9);
    }

    #[test]
    fn test_yaw_rate() {
        let mut estimator = KinematicsEstimator::new();
        estimator.sample(DVec3::ZERO, PsiThetaPhi::new(0.3, 0.0, 0.0), 0.0);
        estimator.sample(DVec3::ZERO, PsiThetaPhi::new(0.35, 0.0, 0.0), 0.1);

        assert_vec_eq(estimator.angular_velocity(), DVec3::new(0.0, 0.0, 0.5), 1e-9);
    }

    #[test]
    fn test_zero_dt_keeps_rates() {
        let mut estimator = KinematicsEstimator::new();
        let orientation = PsiThetaPhi::default();
        estimator.sample(DVec3::ZERO, orientation, 0.0);
        estimator.sample(DVec3::new(0.0, 0.0, 2.0), orientation, 1.0);
        estimator.sample(DVec3::new(0.0, 0.0, 50.0), orientation, 0.0);

        assert_vec_eq(estimator.world_velocity(), DVec3::new(0.0, 0.0, 2.0), 1e-12);
    }
}
