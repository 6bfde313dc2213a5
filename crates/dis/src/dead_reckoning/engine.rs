use glam::DVec3;

use super::kinematics::{
    body_position, rotate_orientation, rotate_quaternion, world_position,
};
use super::other_parameters::LocalOrientation;
use crate::math::{PsiThetaPhi, psi_theta_phi_at_ecef};
use crate::pdu::{DeadReckoningAlgorithm, EntityStatePdu};

/// Result of one extrapolation step. When `supported` is false the PDU is the
/// input unchanged and should not be treated as a prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub pdu: EntityStatePdu,
    pub supported: bool,
}

impl Prediction {
    fn unsupported(pdu: EntityStatePdu) -> Self {
        Self {
            pdu,
            supported: false,
        }
    }
}

/// Extrapolates `last_known` forward by `delta_time` seconds using the dead
/// reckoning algorithm it carries.
///
/// Frozen entities and algorithm ids outside 1..=9 are returned untouched with
/// `supported` cleared.
pub fn dead_reckon(last_known: &EntityStatePdu, delta_time: f32) -> Prediction {
    let mut predicted = last_known.clone();
    let parameters = &last_known.dead_reckoning;
    let algorithm = parameters.algorithm;

    if last_known.is_frozen() || !algorithm.is_supported() {
        return Prediction::unsupported(predicted);
    }

    let dt = delta_time as f64;
    let position = last_known.wire_location();
    let velocity = last_known.linear_velocity.as_dvec3();
    let acceleration = parameters.linear_acceleration.as_dvec3();
    let angular_velocity = parameters.angular_velocity.as_dvec3();
    let orientation = PsiThetaPhi::from_wire(last_known.orientation);

    let location = if algorithm == DeadReckoningAlgorithm::Static {
        position
    } else if algorithm.is_body_frame() {
        // Only the rotating body algorithms bend the path.
        let rate = if algorithm.is_rotating() {
            angular_velocity
        } else {
            DVec3::ZERO
        };
        body_position(
            position,
            orientation,
            velocity,
            acceleration,
            rate,
            algorithm.uses_acceleration(),
            dt,
        )
    } else {
        let acceleration = if algorithm.uses_acceleration() {
            acceleration
        } else {
            DVec3::ZERO
        };
        world_position(position, velocity, acceleration, dt)
    };

    let local = LocalOrientation::parse(&parameters.other_parameters);
    let new_orientation = if algorithm.is_rotating() {
        match local {
            Some(LocalOrientation::Quaternion(q)) => {
                Some(rotate_quaternion(q, angular_velocity, dt))
            }
            _ => Some(rotate_orientation(orientation, angular_velocity, dt)),
        }
    } else {
        match local {
            Some(LocalOrientation::Euler(hpr)) => Some(psi_theta_phi_at_ecef(hpr, position)),
            _ => None,
        }
    };

    predicted.set_location(location);
    if let Some(new_orientation) = new_orientation {
        predicted.orientation = new_orientation.to_wire();
    }
    predicted.linear_velocity += parameters.linear_acceleration * delta_time;

    Prediction {
        pdu: predicted,
        supported: true,
    }
}
