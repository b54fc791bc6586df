//! # Network Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Endpoints for all external connections of the controller executable.
///
/// Loaded from `net.toml`.
#[derive(Deserialize, Debug, Clone)]
pub struct NetParams {
    /// Local address the pose feed reciever binds to, e.g. "0.0.0.0:15000"
    pub pose_bind_addr: String,

    /// Address velocity commands are sent to
    pub cmd_addr: String,

    /// Address telemetry packets are sent to
    pub tm_addr: String,
}
