//! Orbital plane -> ecliptic reference frame.
//! Polar axis is Z, reference axis is X, right-handed.

use glam::{DMat3, DVec3};

/// Composed rotation taking orbital-plane coordinates into the reference frame.
///
/// Applies, in this order: `Rz(-Ω)`, `Rx(-I)`, `Rz(-ϖ)`. No extra 180° turn
/// about Z follows. Angles in radians.
pub fn orbital_frame_matrix(
    inclination: f64,
    ascending_node: f64,
    periapsis_longitude: f64,
) -> DMat3 {
    let node = DMat3::from_rotation_z(-ascending_node);
    let tilt = DMat3::from_rotation_x(-inclination);
    let periapsis = DMat3::from_rotation_z(-periapsis_longitude);
    // rightmost applies first
    periapsis * tilt * node
}

/// Rotate one orbital-plane point into the reference frame. Angles in radians.
pub fn rotate_to_reference_frame(
    point: DVec3,
    inclination: f64,
    ascending_node: f64,
    periapsis_longitude: f64,
) -> DVec3 {
    orbital_frame_matrix(inclination, ascending_node, periapsis_longitude) * point
}

/// Unit normal of the orbital plane expressed in the reference frame.
pub fn orbit_normal(inclination: f64, ascending_node: f64, periapsis_longitude: f64) -> DVec3 {
    orbital_frame_matrix(inclination, ascending_node, periapsis_longitude) * DVec3::Z
}
