use bytemuck::{Pod, Zeroable};
use glam::DVec3;

use crate::elements::OrbitalElements;
use crate::error::{OrbitError, OrbitResult};
use crate::kepler::KeplerSolver;
use crate::position::{frame_matrix, solve_and_rotate};

/// Points per orbit ring used by the view layer unless configured otherwise.
pub const DEFAULT_ORBIT_SEGMENTS: u32 = 128;

/// One line-strip vertex, uploaded as-is to the renderer.
/// 3 floats = 12 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct OrbitVertex {
    pub position: [f32; 3],
}

impl OrbitVertex {
    pub const FLOATS: usize = 3;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;
}

impl From<DVec3> for OrbitVertex {
    fn from(p: DVec3) -> Self {
        Self {
            position: p.as_vec3().to_array(),
        }
    }
}

/// One full revolution sampled at uniform mean-anomaly steps.
///
/// Holds `segments + 1` points; the last repeats the first so a line strip
/// closes on itself.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitPath {
    points: Vec<DVec3>,
    segments: u32,
}

impl OrbitPath {
    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    pub fn segments(&self) -> u32 {
        self.segments
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the last point lands within `tolerance` of the first.
    pub fn is_closed(&self, tolerance: f64) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => first.distance(*last) <= tolerance,
            _ => false,
        }
    }

    /// Single-precision copy for GPU upload.
    pub fn vertices(&self) -> Vec<OrbitVertex> {
        self.points.iter().copied().map(OrbitVertex::from).collect()
    }

    /// Flattened `[x0, y0, z0, x1, ...]` in single precision.
    pub fn to_f32_vec(&self) -> Vec<f32> {
        bytemuck::cast_slice::<OrbitVertex, f32>(&self.vertices()).to_vec()
    }

    /// Flattened `[x0, y0, z0, x1, ...]` in double precision.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        self.points.iter().flat_map(|p| p.to_array()).collect()
    }

    /// Raw vertex bytes, `STRIDE_BYTES` per point.
    pub fn as_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice::<OrbitVertex, u8>(&self.vertices()).to_vec()
    }
}

/// Sample the orbit at `segments + 1` uniform mean anomalies using the
/// canonical solver.
pub fn generate_orbit_path(
    elements: &OrbitalElements,
    segments: u32,
    unit_scale: f64,
) -> OrbitResult<OrbitPath> {
    generate_orbit_path_with(elements, segments, unit_scale, KeplerSolver::default())
}

pub fn generate_orbit_path_with(
    elements: &OrbitalElements,
    segments: u32,
    unit_scale: f64,
    solver: KeplerSolver,
) -> OrbitResult<OrbitPath> {
    if segments == 0 {
        return Err(OrbitError::InvalidSegments);
    }

    // one rotation per body, not per point
    let frame = frame_matrix(elements);
    let step = 360.0 / segments as f64;
    let points = (0..=segments)
        .map(|i| {
            // the closing sample reuses M = 0 exactly
            let mean_anomaly = if i == segments { 0.0 } else { i as f64 * step };
            solve_and_rotate(elements, &frame, mean_anomaly, unit_scale, solver).0
        })
        .collect();

    Ok(OrbitPath { points, segments })
}
