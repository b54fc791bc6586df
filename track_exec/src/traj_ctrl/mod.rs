//! # Trajectory control module
//!
//! Trajectory control is responsible for keeping the robot on the reference
//! path. Each control cycle it locates the nearest reference point under a
//! combined position/heading cost, extracts the look-ahead horizon of
//! reference poses (wrapping cyclically at the end of the path), reconciles
//! heading discontinuities so the solver sees a continuous reference, and
//! delegates the local tracking problem to the horizon solver. The solver's
//! first control action becomes the velocity command for the cycle.
//!
//! Reaching the end of the path is handled by the configured policy: under
//! `stop` the module latches into a stopped mode and commands zero velocity
//! from then on, under `repeat` the horizon start is moved back to the head
//! of the path and tracking continues around the loop.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod horizon;
pub mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use horizon::*;
pub use params::{Params, PathEndPolicy};
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Potential errors that can occur during processing of the module.
#[derive(Debug, thiserror::Error)]
pub enum TrajCtrlError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    /// The reference path could not be loaded. This is fatal at startup, a
    /// controller without a valid path has nothing to track.
    #[error("Could not load the reference path: {0}")]
    PathLoadError(crate::ref_path::RefPathError),

    /// Attempted cyclic processing before the module was initialised.
    #[error("No reference path has been set, was init skipped?")]
    NoPath,

    /// Attempted cyclic processing without a solver instance.
    #[error("No solver has been set, was init skipped?")]
    NoSolver,

    /// Attempted to track when the pose is not known.
    #[error("No pose has been set")]
    NoPose,
}
