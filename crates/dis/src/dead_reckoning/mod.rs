mod engine;
mod kinematics;
mod other_parameters;
mod threshold;

pub use engine::{Prediction, dead_reckon};
pub use kinematics::{
    BodyIntegrals, MIN_ROTATION_RATE, body_position, rotate_orientation,
    rotate_orientation_quaternion, rotate_quaternion, rotation_matrix, rotation_quaternion,
    world_position,
};
pub use other_parameters::{
    LOCAL_EULER_ANGLES, LOCAL_QUATERNION, LocalOrientation, form_other_parameters,
};
pub use threshold::{
    DEFAULT_HEARTBEAT_SECONDS, DEFAULT_ORIENTATION_THRESHOLD_DEG, DEFAULT_POSITION_THRESHOLD_M,
    Thresholds, exceeds_threshold, orientation_exceeds, orientation_exceeds_matrix,
    position_exceeds,
};
