use glam::{DMat3, DVec3};
use serde::{Deserialize, Serialize};

use super::ellipsoid::{LatLonHeight, ecef_to_llh};
use super::rotation::{PsiThetaPhi, rotate_vector_by_axis_angle};

/// Local tangent plane orientation in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HeadingPitchRoll {
    pub heading: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl HeadingPitchRoll {
    pub fn new(heading: f64, pitch: f64, roll: f64) -> Self {
        Self {
            heading,
            pitch,
            roll,
        }
    }

    pub fn from_degrees(heading: f64, pitch: f64, roll: f64) -> Self {
        Self::new(heading.to_radians(), pitch.to_radians(), roll.to_radians())
    }

    pub fn to_degrees(self) -> Self {
        Self::new(
            self.heading.to_degrees(),
            self.pitch.to_degrees(),
            self.roll.to_degrees(),
        )
    }
}

/// An orthonormal triad. For a rotated body these are its forward, right and down axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axes {
    pub x: DVec3,
    pub y: DVec3,
    pub z: DVec3,
}

impl Axes {
    pub const IDENTITY: Self = Self {
        x: DVec3::X,
        y: DVec3::Y,
        z: DVec3::Z,
    };
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NorthEastDown {
    pub north: DVec3,
    pub east: DVec3,
    pub down: DVec3,
}

impl From<NorthEastDown> for Axes {
    fn from(ned: NorthEastDown) -> Self {
        Self {
            x: ned.north,
            y: ned.east,
            z: ned.down,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EastNorthUp {
    pub east: DVec3,
    pub north: DVec3,
    pub up: DVec3,
}

impl From<NorthEastDown> for EastNorthUp {
    fn from(ned: NorthEastDown) -> Self {
        Self {
            east: ned.east,
            north: ned.north,
            up: -ned.down,
        }
    }
}

/// Swaps east and north and flips the vertical. Its own inverse.
pub const ENU_NED_SWAP: DMat3 = DMat3::from_cols(
    DVec3::new(0.0, 1.0, 0.0),
    DVec3::new(1.0, 0.0, 0.0),
    DVec3::new(0.0, 0.0, -1.0),
);

/// NED triad in ECEF at a geodetic position, built by rotating the frame at
/// 0/0 by longitude about north, then by latitude about west.
pub fn ned_at(latitude_deg: f64, longitude_deg: f64) -> NorthEastDown {
    let lon = longitude_deg.to_radians();
    let lat = latitude_deg.to_radians();

    let north = DVec3::Z;
    let east = rotate_vector_by_axis_angle(DVec3::Y, lon, north);
    let down = rotate_vector_by_axis_angle(-DVec3::X, lon, north);

    let west = -east;
    NorthEastDown {
        north: rotate_vector_by_axis_angle(north, lat, west),
        east,
        down: rotate_vector_by_axis_angle(down, lat, west),
    }
}

pub fn ned_at_ecef(ecef: DVec3) -> NorthEastDown {
    let llh = ecef_to_llh(ecef);
    ned_at(llh.latitude, llh.longitude)
}

pub fn enu_at(latitude_deg: f64, longitude_deg: f64) -> EastNorthUp {
    ned_at(latitude_deg, longitude_deg).into()
}

pub fn apply_heading_pitch(heading: f64, pitch: f64, frame: Axes) -> Axes {
    let x = rotate_vector_by_axis_angle(frame.x, heading, frame.z);
    let y = rotate_vector_by_axis_angle(frame.y, heading, frame.z);

    Axes {
        x: rotate_vector_by_axis_angle(x, pitch, y),
        y,
        z: rotate_vector_by_axis_angle(frame.z, pitch, y),
    }
}

pub fn apply_roll(roll: f64, frame: Axes) -> Axes {
    Axes {
        x: frame.x,
        y: rotate_vector_by_axis_angle(frame.y, roll, frame.x),
        z: rotate_vector_by_axis_angle(frame.z, roll, frame.x),
    }
}

pub fn apply_heading_pitch_roll(hpr: HeadingPitchRoll, frame: Axes) -> Axes {
    apply_roll(hpr.roll, apply_heading_pitch(hpr.heading, hpr.pitch, frame))
}

pub fn psi_theta_phi_from_heading_pitch_roll(
    hpr: HeadingPitchRoll,
    latitude_deg: f64,
    longitude_deg: f64,
) -> PsiThetaPhi {
    let body = apply_heading_pitch_roll(hpr, ned_at(latitude_deg, longitude_deg).into());
    let world = Axes::IDENTITY;

    let along_x = body.x.dot(world.x);
    let along_y = body.x.dot(world.y);

    let psi = along_y.atan2(along_x);
    let theta = (-body.x.dot(world.z)).atan2((along_x * along_x + along_y * along_y).sqrt());

    let level = apply_heading_pitch(psi, theta, world);
    let phi = body.y.dot(level.z).atan2(body.y.dot(level.y));

    PsiThetaPhi { psi, theta, phi }
}

pub fn heading_pitch_roll_from_psi_theta_phi(
    ptp: PsiThetaPhi,
    latitude_deg: f64,
    longitude_deg: f64,
) -> HeadingPitchRoll {
    let body = apply_heading_pitch_roll(
        HeadingPitchRoll::new(ptp.psi, ptp.theta, ptp.phi),
        Axes::IDENTITY,
    );
    let ned = ned_at(latitude_deg, longitude_deg);

    let along_north = body.x.dot(ned.north);
    let along_east = body.x.dot(ned.east);

    let heading = along_east.atan2(along_north);
    let pitch = (-body.x.dot(ned.down))
        .atan2((along_east * along_east + along_north * along_north).sqrt());

    let level = apply_heading_pitch(heading, pitch, ned.into());
    let roll = body.y.dot(level.z).atan2(body.y.dot(level.y));

    HeadingPitchRoll {
        heading,
        pitch,
        roll,
    }
}

pub fn psi_theta_phi_from_heading_pitch_roll_degrees(
    hpr_deg: HeadingPitchRoll,
    latitude_deg: f64,
    longitude_deg: f64,
) -> PsiThetaPhi {
    let hpr = HeadingPitchRoll::from_degrees(hpr_deg.heading, hpr_deg.pitch, hpr_deg.roll);
    psi_theta_phi_from_heading_pitch_roll(hpr, latitude_deg, longitude_deg).to_degrees()
}

pub fn heading_pitch_roll_from_psi_theta_phi_degrees(
    ptp_deg: PsiThetaPhi,
    latitude_deg: f64,
    longitude_deg: f64,
) -> HeadingPitchRoll {
    let ptp = PsiThetaPhi::from_degrees(ptp_deg.psi, ptp_deg.theta, ptp_deg.phi);
    heading_pitch_roll_from_psi_theta_phi(ptp, latitude_deg, longitude_deg).to_degrees()
}

/// Local orientation at the geodetic position of an ECEF point.
pub fn heading_pitch_roll_at_ecef(ptp: PsiThetaPhi, ecef: DVec3) -> HeadingPitchRoll {
    let LatLonHeight {
        latitude,
        longitude,
        ..
    } = ecef_to_llh(ecef);
    heading_pitch_roll_from_psi_theta_phi(ptp, latitude, longitude)
}

pub fn psi_theta_phi_at_ecef(hpr: HeadingPitchRoll, ecef: DVec3) -> PsiThetaPhi {
    let LatLonHeight {
        latitude,
        longitude,
        ..
    } = ecef_to_llh(ecef);
    psi_theta_phi_from_heading_pitch_roll(hpr, latitude, longitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec_eq(a: DVec3, b: DVec3) {
        assert!((a - b).length() < 1e-9, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_ned_at_origin() {
        let ned = ned_at(0.0, 0.0);
        assert_vec_eq(ned.north, DVec3::Z);
        assert_vec_eq(ned.east, DVec3::Y);
        assert_vec_eq(ned.down, -DVec3::X);
    }

    #[test]
    fn test_ned_at_north_pole() {
        let ned = ned_at(90.0, 0.0);
        assert_vec_eq(ned.north, -DVec3::X);
        assert_vec_eq(ned.east, DVec3::Y);
        assert_vec_eq(ned.down, -DVec3::Z);
    }

    #[test]
    fn test_enu_from_ned() {
        let ned = ned_at(12.0, 34.0);
        let enu = enu_at(12.0, 34.0);
        assert_vec_eq(enu.up, -ned.down);
        assert_vec_eq(enu.east, ned.east);
        assert_vec_eq(ENU_NED_SWAP * DVec3::new(1.0, 2.0, 3.0), DVec3::new(2.0, 1.0, -3.0));
    }

    #[test]
    fn test_heading_pitch_roll_from_psi_theta_phi() {
        let hpr = heading_pitch_roll_from_psi_theta_phi_degrees(
            PsiThetaPhi::new(-123.0, 47.8, -29.7),
            -34.9,
            138.5,
        );
        assert!((hpr.heading - 135.0).abs() < 1.05);
        assert!((hpr.pitch - 20.0).abs() < 1.05);
        assert!((hpr.roll - 30.0).abs() < 1.05);
    }

    #[test]
    fn test_orientation_conversion_round_trip() {
        let ptp = PsiThetaPhi::new(-0.4, 0.3, 1.2);
        let hpr = heading_pitch_roll_from_psi_theta_phi(ptp, 51.5, -0.12);
        let back = psi_theta_phi_from_heading_pitch_roll(hpr, 51.5, -0.12);
        assert!((back.psi - ptp.psi).abs() < 1e-9);
        assert!((back.theta - ptp.theta).abs() < 1e-9);
        assert!((back.phi - ptp.phi).abs() < 1e-9);
    }

    #[test]
    fn test_level_north_at_equator_points_up_the_axis() {
        let ptp = psi_theta_phi_from_heading_pitch_roll(HeadingPitchRoll::default(), 0.0, 0.0);
        assert!(ptp.psi.abs() < 1e-9);
        assert!((ptp.theta + std::f64::consts::FRAC_PI_2).abs() < 1e-9);
    }
}
