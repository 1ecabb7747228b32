use serde::{Deserialize, Serialize};

use crate::clock::TimeStep;
use crate::error::{OrbitError, OrbitResult};
use crate::kepler::KeplerSolver;
use crate::path::DEFAULT_ORBIT_SEGMENTS;

/// Settings for an animated orrery. Every field may be omitted in JSON.
///
/// Deserializing always runs [`OrreryConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ConfigFields")]
pub struct OrreryConfig {
    /// Display units per AU (default: 1000).
    pub unit_scale: f64,
    /// Segments per orbit ring (default: 128).
    pub orbit_segments: u32,
    /// Solver for per-frame positions.
    pub position_solver: KeplerSolver,
    /// Solver for orbit rings.
    pub path_solver: KeplerSolver,
    /// Starting Julian Day. `None` starts at the caller's wall clock.
    pub start_julian_day: Option<f64>,
    /// Clock advance per tick (default: one day).
    pub time_step: TimeStep,
    /// Wall-clock seconds per tick (default: 1/60).
    pub fixed_dt: f32,
}

impl Default for OrreryConfig {
    fn default() -> Self {
        Self {
            unit_scale: 1000.0,
            orbit_segments: DEFAULT_ORBIT_SEGMENTS,
            position_solver: KeplerSolver::default(),
            path_solver: KeplerSolver::default(),
            start_julian_day: None,
            time_step: TimeStep::default(),
            fixed_dt: 1.0 / 60.0,
        }
    }
}

/// Wire shape of [`OrreryConfig`] before validation.
#[derive(Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ConfigFields {
    unit_scale: f64,
    orbit_segments: u32,
    position_solver: KeplerSolver,
    path_solver: KeplerSolver,
    start_julian_day: Option<f64>,
    time_step: TimeStep,
    fixed_dt: f32,
}

impl Default for ConfigFields {
    fn default() -> Self {
        let d = OrreryConfig::default();
        Self {
            unit_scale: d.unit_scale,
            orbit_segments: d.orbit_segments,
            position_solver: d.position_solver,
            path_solver: d.path_solver,
            start_julian_day: d.start_julian_day,
            time_step: d.time_step,
            fixed_dt: d.fixed_dt,
        }
    }
}

impl TryFrom<ConfigFields> for OrreryConfig {
    type Error = OrbitError;

    fn try_from(f: ConfigFields) -> OrbitResult<Self> {
        let config = OrreryConfig {
            unit_scale: f.unit_scale,
            orbit_segments: f.orbit_segments,
            position_solver: f.position_solver,
            path_solver: f.path_solver,
            start_julian_day: f.start_julian_day,
            time_step: f.time_step,
            fixed_dt: f.fixed_dt,
        };
        config.validate()?;
        Ok(config)
    }
}

fn invalid(field: &'static str, reason: &'static str) -> OrbitError {
    OrbitError::InvalidConfig { field, reason }
}

impl OrreryConfig {
    /// Parse and validate a config from a JSON string.
    pub fn from_json(json: &str) -> OrbitResult<Self> {
        let fields: ConfigFields = serde_json::from_str(json)?;
        Self::try_from(fields)
    }

    /// Check every field a runner depends on. Field names in errors are the
    /// JSON keys.
    pub fn validate(&self) -> OrbitResult<()> {
        if !(self.unit_scale.is_finite() && self.unit_scale > 0.0) {
            return Err(invalid("unitScale", "must be a positive finite number"));
        }
        if self.orbit_segments == 0 {
            return Err(invalid("orbitSegments", "must be at least 1"));
        }
        self.position_solver.validate()?;
        self.path_solver.validate()?;
        if self.start_julian_day.is_some_and(|jd| !jd.is_finite()) {
            return Err(invalid("startJulianDay", "must be finite"));
        }
        self.time_step.validate()?;
        if !(self.fixed_dt.is_finite() && self.fixed_dt > 0.0) {
            return Err(invalid("fixedDt", "must be a positive finite number"));
        }
        Ok(())
    }
}
