//! Trajectory control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Behaviour when the nearest reference point approaches the end of the
/// path.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PathEndPolicy {
    /// Latch into a stopped mode and command zero velocity from then on.
    Stop,

    /// Move the horizon start back to the head of the path and keep
    /// tracking around the loop.
    Repeat,
}

impl Default for PathEndPolicy {
    fn default() -> Self {
        PathEndPolicy::Stop
    }
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for trajectory control
///
/// The nearest-point weight and the horizon scaling values are tuning
/// constants inherited from the recorded missions this controller was
/// originally tuned on. They are parameters rather than constants because
/// no derivation for them is available.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct Params {

    /// End of path behaviour
    pub end_policy: PathEndPolicy,

    /// Weight blending the heading difference into the nearest-point cost,
    /// in meters per radian
    pub nearest_weight: f64,

    /// Paths with fewer points than this use the fixed short-path horizon
    /// length
    pub short_path_threshold: usize,

    /// Horizon length used for short paths
    pub short_path_horizon_len: usize,

    /// For longer paths the horizon length is the path length divided by
    /// this value
    pub points_per_horizon_step: usize,

    /// Linear velocity demand minimum limit
    pub min_lin_ms: f64,

    /// Linear velocity demand maximum limit
    pub max_lin_ms: f64,

    /// Angular velocity demand minimum limit
    pub min_ang_rads: f64,

    /// Angular velocity demand maximum limit
    pub max_ang_rads: f64,

    /// Solver gain on the distance to the tracked reference point
    pub lin_gain: f64,

    /// Solver gain on the heading error to the tracked reference point
    pub head_gain: f64,

    /// Blend factor pulling the solver output toward the reference control,
    /// between 0 (ignore the reference control) and 1 (hold it)
    pub control_smoothing: f64,
}
