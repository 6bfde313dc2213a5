use glam::DVec3;
use serde::{Deserialize, Serialize};

/// WGS84 semi major axis in meters
pub const SEMI_MAJOR_AXIS: f64 = 6378137.0;

/// WGS84 semi minor axis in meters
pub const SEMI_MINOR_AXIS: f64 = 6356752.3142;

/// Geodetic position. Latitude and longitude in degrees, height in meters above the ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLonHeight {
    pub latitude: f64,
    pub longitude: f64,
    pub height: f64,
}

impl LatLonHeight {
    pub fn new(latitude: f64, longitude: f64, height: f64) -> Self {
        Self {
            latitude,
            longitude,
            height,
        }
    }
}

/// Closed form (Heikkinen) ECEF to geodetic conversion. Not iterative; good to
/// roughly five decimal places of latitude. Undefined exactly on the polar axis.
pub fn ecef_to_llh(ecef: DVec3) -> LatLonHeight {
    let a2 = SEMI_MAJOR_AXIS * SEMI_MAJOR_AXIS;
    let b2 = SEMI_MINOR_AXIS * SEMI_MINOR_AXIS;
    let e2 = (a2 - b2) / a2;
    let ep2 = (a2 - b2) / b2;

    let p = (ecef.x * ecef.x + ecef.y * ecef.y).sqrt();
    let z2 = ecef.z * ecef.z;

    let f = 54.0 * b2 * z2;
    let g = p * p + (1.0 - e2) * z2 - e2 * (a2 - b2);
    let c = e2 * e2 * f * p * p / (g * g * g);
    let s = (1.0 + c + (c * c + 2.0 * c).sqrt()).cbrt();
    let k = s + 1.0 + 1.0 / s;
    let big_p = f / (3.0 * k * k * g * g);
    let q = (1.0 + 2.0 * e2 * e2 * big_p).sqrt();

    let r0 = -(big_p * e2 * p) / (1.0 + q)
        + (0.5 * a2 * (1.0 + 1.0 / q)
            - big_p * (1.0 - e2) * z2 / (q * (1.0 + q))
            - 0.5 * big_p * p * p)
            .sqrt();

    let p_minus = p - e2 * r0;
    let u = (p_minus * p_minus + z2).sqrt();
    let v = (p_minus * p_minus + (1.0 - e2) * z2).sqrt();
    let z0 = b2 * ecef.z / (SEMI_MAJOR_AXIS * v);

    LatLonHeight {
        latitude: ((ecef.z + ep2 * z0) / p).atan().to_degrees(),
        longitude: ecef.y.atan2(ecef.x).to_degrees(),
        height: u * (1.0 - b2 / (SEMI_MAJOR_AXIS * v)),
    }
}

pub fn llh_to_ecef(llh: LatLonHeight) -> DVec3 {
    let lat = llh.latitude.to_radians();
    let lon = llh.longitude.to_radians();

    let ratio = SEMI_MINOR_AXIS / SEMI_MAJOR_AXIS;
    let e2 = 1.0 - ratio * ratio;
    let flattening = 1.0 - ratio;
    let n = SEMI_MAJOR_AXIS / (1.0 - e2 * lat.sin() * lat.sin()).sqrt();

    DVec3::new(
        (n + llh.height) * lat.cos() * lon.cos(),
        (n + llh.height) * lat.cos() * lon.sin(),
        ((1.0 - flattening) * (1.0 - flattening) * n + llh.height) * lat.sin(),
    )
}
