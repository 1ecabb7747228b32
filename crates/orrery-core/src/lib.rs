pub mod calendar;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod elements;
pub mod error;
pub mod frame;
pub mod kepler;
pub mod path;
pub mod position;

// Re-export key types at crate root for convenience
pub use calendar::{
    calendar_date, julian_day, julian_day_from_unix_millis, CalendarDate, JD_J2000, JD_UNIX_EPOCH,
};
pub use catalog::{BodyCatalog, BodyId, BodyKind, BodyRecord};
pub use clock::{FixedTimestep, SimulationClock, TimeStep};
pub use config::OrreryConfig;
pub use elements::{ElementsDescriptor, OrbitalElements};
pub use error::{OrbitError, OrbitResult};
pub use frame::{orbital_frame_matrix, rotate_to_reference_frame};
pub use kepler::{orbital_radius, solve_eccentric_anomaly, true_anomaly, KeplerSolution, KeplerSolver};
pub use path::{generate_orbit_path, generate_orbit_path_with, OrbitPath, OrbitVertex, DEFAULT_ORBIT_SEGMENTS};
pub use position::{body_state, compute_position, mean_anomaly_at, position_at_julian_day, BodyState, Position};
