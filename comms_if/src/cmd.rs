//! # Base Velocity Commands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A velocity command for a differential-drive base.
///
/// Bounds on both components are enforced by the producer (the solver
/// contract), not by the message itself.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct VelocityCmd {
    /// Linear velocity demand in meters/second
    pub lin_ms: f64,

    /// Angular velocity demand in radians/second
    pub ang_rads: f64,
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl VelocityCmd {
    /// The full-stop command.
    pub fn zero() -> Self {
        Self {
            lin_ms: 0.0,
            ang_rads: 0.0,
        }
    }

    /// True if both components lie within the given bounds (inclusive).
    pub fn in_bounds(
        &self,
        min_lin_ms: f64,
        max_lin_ms: f64,
        min_ang_rads: f64,
        max_ang_rads: f64
    ) -> bool {
        self.lin_ms >= min_lin_ms
            && self.lin_ms <= max_lin_ms
            && self.ang_rads >= min_ang_rads
            && self.ang_rads <= max_ang_rads
    }
}

impl Default for VelocityCmd {
    fn default() -> Self {
        Self::zero()
    }
}
