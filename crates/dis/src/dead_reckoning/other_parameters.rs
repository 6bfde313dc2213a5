use bytes::{Buf, BufMut};
use glam::{DQuat, DVec3};

use crate::math::{HeadingPitchRoll, PsiThetaPhi, euler_to_quaternion, heading_pitch_roll_at_ecef};
use crate::pdu::{DeadReckoningAlgorithm, OTHER_PARAMETERS_LENGTH};

pub const LOCAL_EULER_ANGLES: u8 = 1;
pub const LOCAL_QUATERNION: u8 = 2;

/// Explicit orientation carried in the 15 "other parameters" bytes of the
/// dead reckoning record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocalOrientation {
    /// Tag 1: local heading, pitch and roll in radians.
    Euler(HeadingPitchRoll),
    /// Tag 2: body to world quaternion.
    Quaternion(DQuat),
}

impl LocalOrientation {
    pub fn parse(other: &[u8; OTHER_PARAMETERS_LENGTH]) -> Option<LocalOrientation> {
        match other[0] {
            LOCAL_EULER_ANGLES => Some(LocalOrientation::Euler(local_euler_angles(other))),
            LOCAL_QUATERNION => Some(LocalOrientation::Quaternion(local_quaternion(other))),
            _ => None,
        }
    }
}

/// Bytes 1..3 are padding, then heading, pitch and roll as f32.
fn local_euler_angles(other: &[u8; OTHER_PARAMETERS_LENGTH]) -> HeadingPitchRoll {
    let mut buf = &other[3..];
    let heading = buf.get_f32() as f64;
    let pitch = buf.get_f32() as f64;
    let roll = buf.get_f32() as f64;
    HeadingPitchRoll::new(heading, pitch, roll)
}

/// Bytes 1..3 hold a 16-bit fixed point w that is only an approximation; w is
/// recomputed from x, y and z so the result is a unit quaternion.
fn local_quaternion(other: &[u8; OTHER_PARAMETERS_LENGTH]) -> DQuat {
    let mut buf = &other[3..];
    let x = buf.get_f32() as f64;
    let y = buf.get_f32() as f64;
    let z = buf.get_f32() as f64;
    let w = (1.0 - (x * x + y * y + z * z)).max(0.0).sqrt();
    DQuat::from_xyzw(x, y, z, w)
}

/// Builds the other parameters record a sender attaches for `algorithm`.
///
/// Non-rotating algorithms carry the local heading, pitch and roll at
/// `location`; rotating ones carry the orientation quaternion. Unsupported
/// algorithms get an all-zero record.
pub fn form_other_parameters(
    algorithm: DeadReckoningAlgorithm,
    orientation: PsiThetaPhi,
    location: DVec3,
) -> [u8; OTHER_PARAMETERS_LENGTH] {
    let mut other = [0u8; OTHER_PARAMETERS_LENGTH];
    if !algorithm.is_supported() {
        return other;
    }

    let mut buf = &mut other[..];
    if algorithm.is_rotating() {
        let mut q = euler_to_quaternion(orientation);
        if q.w < 0.0 {
            q = -q;
        }
        let w_fixed = if q.w >= 1.0 {
            u16::MAX
        } else {
            (q.w * 65536.0) as u16
        };

        buf.put_u8(LOCAL_QUATERNION);
        buf.put_u16(w_fixed);
        buf.put_f32(q.x as f32);
        buf.put_f32(q.y as f32);
        buf.put_f32(q.z as f32);
    } else {
        let hpr = heading_pitch_roll_at_ecef(orientation, location);

        buf.put_u8(LOCAL_EULER_ANGLES);
        buf.put_u16(0);
        buf.put_f32(hpr.heading as f32);
        buf.put_f32(hpr.pitch as f32);
        buf.put_f32(hpr.roll as f32);
    }
    other
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{LatLonHeight, llh_to_ecef};

    #[test]
    fn test_unsupported_algorithm_forms_zeros() {
        let other = form_other_parameters(
            DeadReckoningAlgorithm::Other,
            PsiThetaPhi::new(1.0, 0.5, 0.25),
            DVec3::new(6378137.0, 0.0, 0.0),
        );
        assert_eq!(other, [0u8; OTHER_PARAMETERS_LENGTH]);
        assert_eq!(LocalOrientation::parse(&other), None);
    }

    #[test]
    fn test_euler_parameters_round_trip() {
        let location = llh_to_ecef(LatLonHeight::new(-34.9, 138.5, 50.0));
        let hpr = HeadingPitchRoll::from_degrees(135.0, 20.0, 30.0);
        let ptp = crate::math::psi_theta_phi_at_ecef(hpr, location);

        let other = form_other_parameters(DeadReckoningAlgorithm::Fvw, ptp, location);
        assert_eq!(other[0], LOCAL_EULER_ANGLES);
        assert_eq!(&other[1..3], &[0, 0]);

        match LocalOrientation::parse(&other) {
            Some(LocalOrientation::Euler(parsed)) => {
                assert!((parsed.heading - hpr.heading).abs() < 1e-4);
                assert!((parsed.pitch - hpr.pitch).abs() < 1e-4);
                assert!((parsed.roll - hpr.roll).abs() < 1e-4);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_quaternion_parameters_round_trip() {
        let ptp = PsiThetaPhi::new(2.5, -0.4, 0.9);
        let other = form_other_parameters(DeadReckoningAlgorithm::Rvw, ptp, DVec3::ZERO);
        assert_eq!(other[0], LOCAL_QUATERNION);

        let mut expected = euler_to_quaternion(ptp);
        if expected.w < 0.0 {
            expected = -expected;
        }
        let w_fixed = u16::from_be_bytes([other[1], other[2]]);
        assert_eq!(w_fixed, (expected.w * 65536.0) as u16);

        match LocalOrientation::parse(&other) {
            Some(LocalOrientation::Quaternion(q)) => {
                assert!(q.dot(expected).abs() > 1.0 - 1e-6);
                assert!(q.w >= 0.0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_identity_quaternion_saturates_w() {
        let other = form_other_parameters(
            DeadReckoningAlgorithm::Rpw,
            PsiThetaPhi::default(),
            DVec3::ZERO,
        );
        assert_eq!(&other[1..3], &[0xFF, 0xFF]);
    }
}
