use thiserror::Error;

/// Result type for fallible orbit operations.
pub type OrbitResult<T> = Result<T, OrbitError>;

/// Domain errors raised at the boundary of the orbit engine.
///
/// Solver non-convergence is not an error; the solver hands back its last
/// iterate.
#[derive(Error, Debug)]
pub enum OrbitError {
    #[error("eccentricity {0} is outside the supported bound-ellipse range [0, 1)")]
    EccentricityOutOfRange(f64),

    #[error("semi-major axis must be positive, got {0}")]
    NonPositiveSemiMajorAxis(f64),

    #[error("orbital element `{field}` is not a finite number")]
    NonFinite { field: &'static str },

    #[error("orbit path needs at least one segment")]
    InvalidSegments,

    #[error("no body named {0:?} in catalog")]
    UnknownBody(String),

    #[error("body id {0} appears more than once in catalog")]
    DuplicateBodyId(u32),

    #[error("catalog has no free body id left")]
    BodyIdsExhausted,

    #[error("config field `{field}` {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
