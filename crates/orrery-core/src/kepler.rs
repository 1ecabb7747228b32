//! Kepler's equation and the anomaly/radius transforms that follow from it.
//! Pure math on radians, no element types involved.

use serde::{Deserialize, Serialize};

use crate::error::{OrbitError, OrbitResult};

/// Residual threshold for the canonical solver.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;
/// Iteration cap for the canonical solver.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;
/// Iteration count for the relaxation solver.
pub const DEFAULT_RELAXATION_ITERATIONS: u32 = 10;
/// Largest iteration budget a configured solver may ask for.
pub const MAX_SOLVER_ITERATIONS: u32 = 10_000;

/// Strategy used to solve `M = E - e·sin(E)` for `E`.
///
/// Both strategies iterate `E ← M + e·sin(E)` from `E₀ = M`; they differ only
/// in how they stop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum KeplerSolver {
    /// Iterate until the residual drops below `tolerance`, giving up after
    /// `max_iterations` with the last iterate.
    FixedPoint { tolerance: f64, max_iterations: u32 },
    /// Run a fixed number of iterations. Cheap, approximate for high `e`.
    Relaxation { iterations: u32 },
}

impl Default for KeplerSolver {
    fn default() -> Self {
        KeplerSolver::FixedPoint {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Outcome of one solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeplerSolution {
    /// Eccentric anomaly (radians).
    pub eccentric_anomaly: f64,
    /// Iterations performed.
    pub iterations: u32,
    /// `M - (E - e·sin(E))` at the returned `E`.
    pub residual: f64,
    /// Whether the residual is under the tolerance.
    pub converged: bool,
}

impl KeplerSolver {
    pub const fn relaxation() -> Self {
        KeplerSolver::Relaxation {
            iterations: DEFAULT_RELAXATION_ITERATIONS,
        }
    }

    /// Reject tolerances and iteration budgets that cannot produce a usable solve.
    pub fn validate(&self) -> OrbitResult<()> {
        let (field, iterations) = match *self {
            KeplerSolver::FixedPoint {
                tolerance,
                max_iterations,
            } => {
                if !(tolerance.is_finite() && tolerance > 0.0) {
                    return Err(OrbitError::InvalidConfig {
                        field: "tolerance",
                        reason: "must be a positive finite number",
                    });
                }
                ("max_iterations", max_iterations)
            }
            KeplerSolver::Relaxation { iterations } => ("iterations", iterations),
        };
        if !(1..=MAX_SOLVER_ITERATIONS).contains(&iterations) {
            return Err(OrbitError::InvalidConfig {
                field,
                reason: "must lie in 1..=10000",
            });
        }
        Ok(())
    }

    /// Solve for the eccentric anomaly.
    ///
    /// `eccentricity` must lie in `[0, 1)`. Elements built through
    /// [`crate::elements::OrbitalElements`] always do; for raw input use
    /// [`KeplerSolver::try_solve`].
    ///
    /// Never fails: a solve that runs out of iterations returns its last
    /// iterate with `converged == false`.
    pub fn solve(self, mean_anomaly: f64, eccentricity: f64) -> KeplerSolution {
        debug_assert!(
            (0.0..1.0).contains(&eccentricity),
            "eccentricity {eccentricity} outside [0, 1)"
        );
        match self {
            KeplerSolver::FixedPoint {
                tolerance,
                max_iterations,
            } => solve_fixed_point(mean_anomaly, eccentricity, tolerance, max_iterations),
            KeplerSolver::Relaxation { iterations } => {
                solve_relaxation(mean_anomaly, eccentricity, iterations)
            }
        }
    }

    /// [`KeplerSolver::solve`] for unvalidated input.
    pub fn try_solve(self, mean_anomaly: f64, eccentricity: f64) -> OrbitResult<KeplerSolution> {
        if !(0.0..1.0).contains(&eccentricity) {
            return Err(OrbitError::EccentricityOutOfRange(eccentricity));
        }
        Ok(self.solve(mean_anomaly, eccentricity))
    }
}

#[inline]
fn kepler_residual(mean_anomaly: f64, eccentricity: f64, eccentric_anomaly: f64) -> f64 {
    mean_anomaly - (eccentric_anomaly - eccentricity * eccentric_anomaly.sin())
}

fn solve_fixed_point(
    mean_anomaly: f64,
    eccentricity: f64,
    tolerance: f64,
    max_iterations: u32,
) -> KeplerSolution {
    let mut ea = mean_anomaly; // initial guess
    let mut residual = kepler_residual(mean_anomaly, eccentricity, ea);
    let mut iterations = 0;

    loop {
        if residual.abs() < tolerance {
            return KeplerSolution {
                eccentric_anomaly: ea,
                iterations,
                residual,
                converged: true,
            };
        }
        if iterations >= max_iterations {
            log::debug!(
                "kepler: no convergence after {iterations} iterations (M={mean_anomaly}, e={eccentricity}, residual={residual:e})"
            );
            return KeplerSolution {
                eccentric_anomaly: ea,
                iterations,
                residual,
                converged: false,
            };
        }
        ea += residual;
        residual = kepler_residual(mean_anomaly, eccentricity, ea);
        iterations += 1;
    }
}

fn solve_relaxation(mean_anomaly: f64, eccentricity: f64, iterations: u32) -> KeplerSolution {
    let mut ea = mean_anomaly;
    for _ in 0..iterations {
        ea = mean_anomaly + eccentricity * ea.sin();
    }
    let residual = kepler_residual(mean_anomaly, eccentricity, ea);
    KeplerSolution {
        eccentric_anomaly: ea,
        iterations,
        residual,
        converged: residual.abs() < DEFAULT_TOLERANCE,
    }
}

/// Eccentric anomaly (radians) for `mean_anomaly` (radians), canonical solver.
/// Errors when `eccentricity` is outside `[0, 1)`.
pub fn solve_eccentric_anomaly(mean_anomaly: f64, eccentricity: f64) -> OrbitResult<f64> {
    Ok(KeplerSolver::default()
        .try_solve(mean_anomaly, eccentricity)?
        .eccentric_anomaly)
}

/// True anomaly (radians) from eccentric anomaly. Valid for `0 ≤ e < 1`.
#[inline]
pub fn true_anomaly(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    let half = eccentric_anomaly / 2.0;
    2.0 * ((1.0 + eccentricity).sqrt() * half.sin()).atan2((1.0 - eccentricity).sqrt() * half.cos())
}

/// Distance from the focus at `true_anomaly`, in the unit of `semi_major_axis`.
#[inline]
pub fn orbital_radius(semi_major_axis: f64, eccentricity: f64, true_anomaly: f64) -> f64 {
    let semilatus_rectum = semi_major_axis * (1.0 - eccentricity * eccentricity);
    semilatus_rectum / (1.0 + eccentricity * true_anomaly.cos())
}

/// Map any angle in degrees into `[0, 360)`.
#[inline]
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negatives up to exactly 360
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{PI, TAU};

    #[test]
    fn solver_satisfies_kepler_equation() {
        for ei in 0..=18 {
            let e = ei as f64 * 0.05;
            for mi in 0..72 {
                let m = mi as f64 / 72.0 * TAU;
                let ea = solve_eccentric_anomaly(m, e).unwrap();
                let residual = m - (ea - e * ea.sin());
                assert!(residual.abs() < 1e-5, "e={e} M={m} residual={residual}");
            }
        }
    }

    #[test]
    fn circular_orbit_is_identity() {
        let solution = KeplerSolver::default().solve(1.0, 0.0);
        assert_eq!(solution.eccentric_anomaly, 1.0);
        assert_eq!(solution.iterations, 0);
        assert!(solution.converged);
    }

    #[test]
    fn mercury_converges_fast() {
        let solution = KeplerSolver::default().solve(1.5, 0.2056);
        assert!(solution.converged);
        assert!(solution.iterations < 20, "took {}", solution.iterations);
        assert!(solution.residual.abs() < DEFAULT_TOLERANCE);
    }

    #[test]
    fn iteration_cap_returns_best_estimate() {
        let solver = KeplerSolver::FixedPoint {
            tolerance: 1e-15,
            max_iterations: 3,
        };
        let solution = solver.solve(0.3, 0.95);
        assert!(!solution.converged);
        assert_eq!(solution.iterations, 3);
        assert!(solution.eccentric_anomaly.is_finite());
        // closer than the initial guess
        assert!(solution.residual.abs() < kepler_residual(0.3, 0.95, 0.3).abs());
    }

    #[test]
    fn nan_input_terminates() {
        let solution = KeplerSolver::default().solve(f64::NAN, 0.5);
        assert!(!solution.converged);
        assert_eq!(solution.iterations, DEFAULT_MAX_ITERATIONS);
    }

    #[test]
    fn near_parabolic_terminates() {
        let solution = KeplerSolver::default().solve(0.01, 0.999_999);
        assert!(solution.iterations <= DEFAULT_MAX_ITERATIONS);
        assert!(solution.eccentric_anomaly.is_finite());
    }

    #[test]
    fn relaxation_matches_fixed_point_for_low_eccentricity() {
        for mi in 0..36 {
            let m = mi as f64 / 36.0 * TAU;
            let fixed = KeplerSolver::default().solve(m, 0.0167).eccentric_anomaly;
            let relaxed = KeplerSolver::relaxation().solve(m, 0.0167);
            assert_eq!(relaxed.iterations, DEFAULT_RELAXATION_ITERATIONS);
            assert_abs_diff_eq!(relaxed.eccentric_anomaly, fixed, epsilon = 1e-5);
        }
    }

    #[test]
    fn true_anomaly_equals_eccentric_anomaly_when_circular() {
        for &ea in &[-3.0, -1.2, 0.0, 0.4, 1.0, 2.5, 3.1] {
            assert_abs_diff_eq!(true_anomaly(ea, 0.0), ea, epsilon = 1e-12);
        }
    }

    #[test]
    fn true_anomaly_leads_eccentric_anomaly_after_periapsis() {
        let e = 0.5;
        let ea = PI / 2.0;
        let v = true_anomaly(ea, e);
        assert!(v > ea);
        // cos v = (cos E - e) / (1 - e cos E)
        assert_abs_diff_eq!(v.cos(), (ea.cos() - e) / (1.0 - e * ea.cos()), epsilon = 1e-12);
        assert_abs_diff_eq!(true_anomaly(PI, e), PI, epsilon = 1e-12);
    }

    #[test]
    fn radius_is_semi_major_axis_when_circular() {
        for i in 0..16 {
            let v = i as f64 / 16.0 * TAU;
            assert_abs_diff_eq!(orbital_radius(2.5, 0.0, v), 2.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn radius_at_apsides() {
        let (a, e) = (1.5, 0.2);
        assert_abs_diff_eq!(orbital_radius(a, e, 0.0), a * (1.0 - e), epsilon = 1e-12);
        assert_abs_diff_eq!(orbital_radius(a, e, PI), a * (1.0 + e), epsilon = 1e-12);
    }

    #[test]
    fn normalize_degrees_wraps_into_range() {
        assert_eq!(normalize_degrees(0.0), 0.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(725.0), 5.0);
        assert_eq!(normalize_degrees(-1e-20), 0.0);
    }

    #[test]
    fn solver_serializes_with_method_tag() {
        let json = serde_json::to_string(&KeplerSolver::relaxation()).unwrap();
        assert_eq!(json, r#"{"method":"relaxation","iterations":10}"#);
        let parsed: KeplerSolver =
            serde_json::from_str(r#"{"method":"fixed_point","tolerance":1e-8,"max_iterations":50}"#).unwrap();
        assert_eq!(
            parsed,
            KeplerSolver::FixedPoint {
                tolerance: 1e-8,
                max_iterations: 50
            }
        );
    }

    #[test]
    fn unbound_eccentricity_is_a_domain_error() {
        for e in [1.0, 1.5, -0.2, f64::NAN] {
            assert!(matches!(
                solve_eccentric_anomaly(0.5, e),
                Err(OrbitError::EccentricityOutOfRange(_))
            ));
        }
        assert!(KeplerSolver::relaxation().try_solve(0.5, 0.3).is_ok());
    }

    #[test]
    fn validate_rejects_unusable_budgets() {
        assert!(KeplerSolver::default().validate().is_ok());
        assert!(KeplerSolver::relaxation().validate().is_ok());

        let bad = [
            KeplerSolver::FixedPoint { tolerance: 0.0, max_iterations: 100 },
            KeplerSolver::FixedPoint { tolerance: f64::NAN, max_iterations: 100 },
            KeplerSolver::FixedPoint { tolerance: 1e-6, max_iterations: 0 },
            KeplerSolver::FixedPoint { tolerance: 1e-6, max_iterations: u32::MAX },
            KeplerSolver::Relaxation { iterations: 0 },
        ];
        for solver in bad {
            assert!(
                matches!(solver.validate(), Err(OrbitError::InvalidConfig { .. })),
                "{solver:?} accepted"
            );
        }
    }
}
