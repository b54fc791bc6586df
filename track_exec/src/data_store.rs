//! # Data Store

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::{loc::Pose2D, traj_ctrl};
use comms_if::cmd::VelocityCmd;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
///
/// All state the executive carries between cycles lives here, so a cycle is
/// a pure function of the data store plus the inputs read at its start.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    // Localisation
    /// Snapshot of the robot pose read at the start of the cycle
    pub robot_pose: Option<Pose2D>,

    // TrajCtrl
    pub traj_ctrl: traj_ctrl::TrajCtrl,
    pub traj_ctrl_input: traj_ctrl::InputData,
    pub traj_ctrl_cmd: Option<VelocityCmd>,
    pub traj_ctrl_status_rpt: traj_ctrl::StatusReport,

    // Monitoring counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    /// Number of consecutive command send errors
    pub num_consec_cmd_send_errors: u64,
}
