//! Elements + instant -> heliocentric position. No state.

use glam::{DMat3, DVec3};

use crate::calendar::{julian_day, CalendarDate};
use crate::elements::OrbitalElements;
use crate::frame::orbital_frame_matrix;
use crate::kepler::{normalize_degrees, orbital_radius, true_anomaly, KeplerSolution, KeplerSolver};

/// Heliocentric Cartesian position, in the unit of `semi_major_axis` times
/// whatever scale the caller applied.
pub type Position = DVec3;

/// Diagnostic snapshot of a body at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    /// Julian Day the state was evaluated at.
    pub julian_day: f64,
    /// Mean anomaly (degrees, `[0, 360)`).
    pub mean_anomaly: f64,
    /// Eccentric anomaly (radians).
    pub eccentric_anomaly: f64,
    /// True anomaly (radians).
    pub true_anomaly: f64,
    /// Distance from the focus, unscaled.
    pub radius: f64,
    /// Scaled position in the reference frame.
    pub position: Position,
    /// Whether the Kepler solve reached its tolerance.
    pub converged: bool,
}

/// Mean anomaly (degrees, normalized into `[0, 360)`) at Julian Day `jd`.
pub fn mean_anomaly_at(elements: &OrbitalElements, jd: f64) -> f64 {
    normalize_degrees(elements.mean_longitude_at(jd) - elements.longitude_of_periapsis())
}

/// Orbital-plane coordinates at eccentric anomaly `ea` (radians), periapsis on +X.
#[inline]
pub fn orbital_plane_position(elements: &OrbitalElements, ea: f64) -> DVec3 {
    let a = elements.semi_major_axis();
    let e = elements.eccentricity();
    DVec3::new(a * (ea.cos() - e), a * (1.0 - e * e).sqrt() * ea.sin(), 0.0)
}

/// Rotation from the body's orbital plane into the reference frame.
pub fn frame_matrix(elements: &OrbitalElements) -> DMat3 {
    orbital_frame_matrix(
        elements.inclination_rad(),
        elements.ascending_node_rad(),
        elements.periapsis_longitude_rad(),
    )
}

/// Solve Kepler's equation for the mean anomaly (degrees) and place the
/// result in the reference frame. Shared by the dated and swept paths.
pub(crate) fn solve_and_rotate(
    elements: &OrbitalElements,
    frame: &DMat3,
    mean_anomaly_deg: f64,
    unit_scale: f64,
    solver: KeplerSolver,
) -> (Position, KeplerSolution) {
    let solution = solver.solve(mean_anomaly_deg.to_radians(), elements.eccentricity());
    let plane = orbital_plane_position(elements, solution.eccentric_anomaly);
    (*frame * plane * unit_scale, solution)
}

/// Position at Julian Day `jd` using the canonical solver.
pub fn position_at_julian_day(elements: &OrbitalElements, jd: f64, unit_scale: f64) -> Position {
    position_at_julian_day_with(elements, jd, unit_scale, KeplerSolver::default())
}

pub fn position_at_julian_day_with(
    elements: &OrbitalElements,
    jd: f64,
    unit_scale: f64,
    solver: KeplerSolver,
) -> Position {
    let mean_anomaly = mean_anomaly_at(elements, jd);
    let (position, _) = solve_and_rotate(elements, &frame_matrix(elements), mean_anomaly, unit_scale, solver);
    position
}

/// Position of a body at a UTC calendar date.
///
/// `unit_scale` multiplies the result (e.g. 1000 display units per AU).
pub fn compute_position(elements: &OrbitalElements, date: &CalendarDate, unit_scale: f64) -> Position {
    position_at_julian_day(elements, julian_day(date), unit_scale)
}

/// Full anomaly breakdown at Julian Day `jd`.
pub fn body_state(
    elements: &OrbitalElements,
    jd: f64,
    unit_scale: f64,
    solver: KeplerSolver,
) -> BodyState {
    let mean_anomaly = mean_anomaly_at(elements, jd);
    let (position, solution) =
        solve_and_rotate(elements, &frame_matrix(elements), mean_anomaly, unit_scale, solver);
    let e = elements.eccentricity();
    let v = true_anomaly(solution.eccentric_anomaly, e);

    BodyState {
        julian_day: jd,
        mean_anomaly,
        eccentric_anomaly: solution.eccentric_anomaly,
        true_anomaly: v,
        radius: orbital_radius(elements.semi_major_axis(), e, v),
        position,
        converged: solution.converged,
    }
}
