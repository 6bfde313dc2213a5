use glam::DVec3;

use dis::entity::LocalPose;
use dis::math::{HeadingPitchRoll, LatLonHeight, enu_at, llh_to_ecef, psi_theta_phi_at_ecef};

use crate::config::DemoEntityConfig;

/// Level circle flown counter clockwise seen from above.
#[derive(Debug, Clone)]
pub struct CirclingFlight {
    center: DVec3,
    east: DVec3,
    north: DVec3,
    radius: f64,
    angular_rate: f64,
    elapsed: f64,
}

impl CirclingFlight {
    pub fn new(config: &DemoEntityConfig) -> Self {
        let center = llh_to_ecef(LatLonHeight::new(
            config.latitude,
            config.longitude,
            config.height,
        ));
        let enu = enu_at(config.latitude, config.longitude);
        let radius = config.radius_m.max(1.0);

        Self {
            center,
            east: enu.east,
            north: enu.north,
            radius,
            angular_rate: config.speed_mps / radius,
            elapsed: 0.0,
        }
    }

    pub fn pose(&self) -> LocalPose {
        let angle = self.angular_rate * self.elapsed;
        let (sin, cos) = angle.sin_cos();
        let location = self.center + self.radius * (cos * self.east + sin * self.north);

        // Travel direction is (-sin, cos) in east/north.
        let heading = (-sin).atan2(cos);
        let orientation =
            psi_theta_phi_at_ecef(HeadingPitchRoll::new(heading, 0.0, 0.0), location);

        LocalPose::new(location, orientation)
    }

    pub fn advance(&mut self, dt: f64) -> LocalPose {
        self.elapsed += dt;
        self.pose()
    }
}
