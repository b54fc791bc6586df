//! # Telemetry Packets
//!
//! One packet is sent per control cycle to the external plotter. Delivery is
//! best-effort, the controller never waits on or retries a telemetry send.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Diagnostic data describing one control cycle.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct TmPacket {
    /// Actual position of the robot along the world X axis in meters
    pub actual_x_m: f64,

    /// Actual position of the robot along the world Y axis in meters
    pub actual_y_m: f64,

    /// X coordinates of the solver's predicted trajectory in meters
    pub forecast_x_m: Vec<f64>,

    /// Y coordinates of the solver's predicted trajectory in meters
    pub forecast_y_m: Vec<f64>,

    /// X coordinate of the nearest reference point in meters
    pub nearest_x_m: f64,

    /// Y coordinate of the nearest reference point in meters
    pub nearest_y_m: f64,

    /// Time taken by the solver on this cycle in seconds
    pub solve_time_s: f64,
}
