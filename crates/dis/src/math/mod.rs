mod ellipsoid;
mod frames;
mod rotation;

pub use ellipsoid::{LatLonHeight, SEMI_MAJOR_AXIS, SEMI_MINOR_AXIS, ecef_to_llh, llh_to_ecef};
pub use frames::{
    Axes, ENU_NED_SWAP, EastNorthUp, HeadingPitchRoll, NorthEastDown, apply_heading_pitch,
    apply_heading_pitch_roll, apply_roll, enu_at, heading_pitch_roll_at_ecef,
    heading_pitch_roll_from_psi_theta_phi, heading_pitch_roll_from_psi_theta_phi_degrees, ned_at,
    ned_at_ecef, psi_theta_phi_at_ecef, psi_theta_phi_from_heading_pitch_roll,
    psi_theta_phi_from_heading_pitch_roll_degrees,
};
pub use rotation::{
    GIMBAL_LOCK_COSINE, PsiThetaPhi, axis_angle_matrix, directional_rotation_difference,
    euler_to_quaternion, euler_to_rotation_matrix, outer_product, quaternion_to_euler,
    rotate_vector_by_axis_angle, rotate_vector_by_axis_angle_degrees, rotation_matrix_to_euler,
    skew_matrix,
};
