//! # Localisation types
//!
//! The controller works in a single fixed world frame, so localisation
//! reduces to the planar pose recieved from the external feed.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The pose (position and heading in the world frame) of the robot.
///
/// The heading is the angle to the world +X axis, nominally in (-pi, pi].
/// Intermediate unwrapped values produced during horizon planning may exceed
/// this range, so consumers must not assume the nominal range.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct Pose2D {
    /// The position in the world frame
    pub position_m: Vector2<f64>,

    /// The heading in radians
    pub heading_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose2D {
    /// Create a new pose from raw coordinates.
    pub fn new(x_m: f64, y_m: f64, heading_rad: f64) -> Self {
        Self {
            position_m: Vector2::new(x_m, y_m),
            heading_rad,
        }
    }

    /// Return the euclidian distance to another pose's position.
    pub fn distance_to(&self, other: &Pose2D) -> f64 {
        (other.position_m - self.position_m).norm()
    }
}

impl Default for Pose2D {
    fn default() -> Self {
        Self {
            position_m: Vector2::new(0.0, 0.0),
            heading_rad: 0.0,
        }
    }
}
