use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::math::{PsiThetaPhi, euler_to_quaternion, euler_to_rotation_matrix};
use crate::pdu::EntityStatePdu;

pub const DEFAULT_POSITION_THRESHOLD_M: f64 = 1.0;
pub const DEFAULT_ORIENTATION_THRESHOLD_DEG: f64 = 3.0;
pub const DEFAULT_HEARTBEAT_SECONDS: f64 = 5.0;

/// Sender side limits on how far the remote view may drift before a fresh
/// PDU goes out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub position_m: f64,
    pub orientation_deg: f64,
    pub heartbeat_seconds: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            position_m: DEFAULT_POSITION_THRESHOLD_M,
            orientation_deg: DEFAULT_ORIENTATION_THRESHOLD_DEG,
            heartbeat_seconds: DEFAULT_HEARTBEAT_SECONDS,
        }
    }
}

impl Thresholds {
    /// True once the time since the last send exceeds the heartbeat interval.
    pub fn heartbeat_due(&self, seconds_since_last_send: f64) -> bool {
        seconds_since_last_send > self.heartbeat_seconds
    }

    /// Threshold test OR'd with the heartbeat.
    pub fn needs_update(
        &self,
        predicted: &EntityStatePdu,
        actual: &EntityStatePdu,
        seconds_since_last_send: f64,
    ) -> bool {
        self.heartbeat_due(seconds_since_last_send)
            || exceeds_threshold(self.position_m, self.orientation_deg, predicted, actual)
    }
}

/// True when the actual state has drifted past either threshold from what the
/// receivers are predicting.
pub fn exceeds_threshold(
    position_threshold_m: f64,
    orientation_threshold_deg: f64,
    predicted: &EntityStatePdu,
    actual: &EntityStatePdu,
) -> bool {
    position_exceeds(
        position_threshold_m,
        predicted.wire_location(),
        actual.wire_location(),
    ) || orientation_exceeds(
        orientation_threshold_deg,
        PsiThetaPhi::from_wire(predicted.orientation),
        PsiThetaPhi::from_wire(actual.orientation),
    )
}

/// Compared per axis, not by distance.
pub fn position_exceeds(threshold_m: f64, predicted: DVec3, actual: DVec3) -> bool {
    let delta = (actual - predicted).abs();
    delta.x > threshold_m || delta.y > threshold_m || delta.z > threshold_m
}

/// Quaternion form: `1 - |q_a . q_p| > 1 - cos(threshold / 2)`. The absolute
/// value makes `q` and `-q` compare equal.
pub fn orientation_exceeds(threshold_deg: f64, predicted: PsiThetaPhi, actual: PsiThetaPhi) -> bool {
    let epsilon = 1.0 - (threshold_deg.to_radians() / 2.0).cos();
    let predicted = euler_to_quaternion(predicted).normalize();
    let actual = euler_to_quaternion(actual).normalize();
    1.0 - actual.dot(predicted).abs() > epsilon
}

/// Rotation matrix form: `3 - trace(R_p^T R_a) > 2 - 2 cos(threshold)`.
pub fn orientation_exceeds_matrix(
    threshold_deg: f64,
    predicted: PsiThetaPhi,
    actual: PsiThetaPhi,
) -> bool {
    let delta = 2.0 - 2.0 * threshold_deg.to_radians().cos();
    let product = euler_to_rotation_matrix(predicted).transpose() * euler_to_rotation_matrix(actual);
    let trace = product.x_axis.x + product.y_axis.y + product.z_axis.z;
    3.0 - trace > delta
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::pdu::EntityId;

    fn at(location: DVec3, orientation: Vec3) -> EntityStatePdu {
        let mut pdu = EntityStatePdu::new(EntityId::new(1, 1, 1));
        pdu.set_location(location);
        pdu.orientation = orientation;
        pdu
    }

    #[test]
    fn test_position_is_checked_per_axis() {
        // 0.9 m on every axis is 1.56 m away but inside a 1 m per axis limit.
        assert!(!position_exceeds(1.0, DVec3::ZERO, DVec3::splat(0.9)));
        assert!(position_exceeds(1.0, DVec3::ZERO, DVec3::new(0.0, -1.1, 0.0)));
    }

    #[test]
    fn test_orientation_threshold() {
        let base = PsiThetaPhi::from_degrees(30.0, 10.0, -5.0);
        let small = PsiThetaPhi::from_degrees(32.0, 10.0, -5.0);
        let large = PsiThetaPhi::from_degrees(34.0, 10.0, -5.0);
        assert!(!orientation_exceeds(3.0, base, small));
        assert!(orientation_exceeds(3.0, base, large));
    }

    #[test]
    fn test_quaternion_and_matrix_forms_agree() {
        let base = PsiThetaPhi::from_degrees(-120.0, 40.0, 170.0);
        for step in 0..60 {
            let offset = step as f64 * 0.1;
            let other = PsiThetaPhi::from_degrees(-120.0 + offset, 40.0 - offset * 0.5, 170.0 + offset);
            // Skip samples within rounding of the boundary.
            let q = euler_to_quaternion(base).dot(euler_to_quaternion(other)).abs().min(1.0);
            let angle = 2.0 * q.acos();
            if (angle - 3f64.to_radians()).abs() < 1e-6 {
                continue;
            }
            assert_eq!(
                orientation_exceeds(3.0, base, other),
                orientation_exceeds_matrix(3.0, base, other),
                "disagree at offset {}",
                offset
            );
        }
    }

    #[test]
    fn test_threshold_is_monotonic() {
        let base = PsiThetaPhi::default();
        let mut tripped = false;
        for step in 0..100 {
            let other = PsiThetaPhi::from_degrees(step as f64 * 0.1, 0.0, 0.0);
            let exceeded = orientation_exceeds(3.0, base, other);
            assert!(!tripped || exceeded, "threshold released at step {}", step);
            tripped |= exceeded;
        }
        assert!(tripped);
    }

    #[test]
    fn test_position_threshold_is_monotonic() {
        let predicted = at(DVec3::new(-2142319.0, -4589392.0, 3876650.0), Vec3::ZERO);
        for axis in [DVec3::X, DVec3::Y, DVec3::Z, -DVec3::Y] {
            let mut first_trip = None;
            for step in 0..=300 {
                let offset = step as f64 * 0.01;
                let actual = at(predicted.wire_location() + axis * offset, Vec3::ZERO);
                let exceeded = exceeds_threshold(1.0, 3.0, &predicted, &actual);
                match first_trip {
                    None if exceeded => first_trip = Some(step),
                    Some(_) => assert!(exceeded, "released at {} m along {:?}", offset, axis),
                    None => {}
                }
            }
            assert_eq!(first_trip, Some(101), "along {:?}", axis);
        }
    }

    #[test]
    fn test_heartbeat_forces_update() {
        let thresholds = Thresholds::default();
        let pdu = at(DVec3::new(10.0, 20.0, 30.0), Vec3::ZERO);
        assert!(!thresholds.needs_update(&pdu, &pdu, 4.9));
        assert!(!thresholds.needs_update(&pdu, &pdu, 5.0));
        assert!(thresholds.needs_update(&pdu, &pdu, 5.001));

        let moved = at(DVec3::new(10.0, 21.5, 30.0), Vec3::ZERO);
        assert!(thresholds.needs_update(&pdu, &moved, 0.0));
    }
}
