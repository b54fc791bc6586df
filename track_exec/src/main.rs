//! Main controller-side executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - System input acquisition:
//!             - Pose snapshot from the pose feed client
//!         - Trajectory control processing
//!         - Command output to the base
//!         - Telemetry output to the plotter
//!         - Cycle management
//!
//! The pose feed itself runs on a background thread owned by the pose
//! client, the main loop only ever reads a snapshot of the latest pose.
//!
//! # Modules
//!
//! All cyclic modules (currently only `traj_ctrl`) shall provide a public
//! struct implementing the `util::module::State` trait.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use track_lib::{
    cmd_client::CmdClient,
    data_store::DataStore,
    pose_client::PoseClient,
    tm_client::{self, TmClient},
    traj_ctrl,
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use comms_if::net::NetParams;
use util::{
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the executive itself.
#[derive(Deserialize, Debug)]
struct ExecParams {
    /// Rate of the control cycle in Hz
    cycle_rate_hz: f64,

    /// Reference trajectory file, relative to the software root unless
    /// absolute
    trajectory_file: String,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "track_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Trajectory Tracking Controller Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: ExecParams = util::params::load(
        "exec.toml"
    ).wrap_err("Could not load exec params")?;

    let net_params: NetParams = util::params::load(
        "net.toml"
    ).wrap_err("Could not load net params")?;

    info!("Exec parameters loaded");

    if exec_params.cycle_rate_hz <= 0.0 {
        return Err(eyre!(
            "Cycle rate must be positive, found {}", exec_params.cycle_rate_hz
        ));
    }

    let cycle_period_s = 1.0 / exec_params.cycle_rate_hz;

    // ---- TRAJECTORY SELECTION ----

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    // A single argument overrides the trajectory file from the parameters
    let trajectory_path = if args.len() == 2 {
        info!("Using trajectory from \"{}\"", &args[1]);
        PathBuf::from(&args[1])
    }
    else if args.len() == 1 {
        resolve_in_sw_root(&exec_params.trajectory_file)
            .wrap_err("Could not resolve the trajectory file path")?
    }
    else {
        return Err(eyre!(
            "Expected either zero or one argument, found {}", args.len() - 1)
        );
    };

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.traj_ctrl.init(
        traj_ctrl::InitData {
            params_file: "traj_ctrl.toml",
            trajectory_path,
            cycle_period_s,
        },
        &session
    ).wrap_err("Failed to initialise TrajCtrl")?;
    info!("TrajCtrl init complete");

    info!("Module initialisation complete\n");

    // ---- INITIALISE NETWORK ----

    info!("Initialising network");

    let pose_client = PoseClient::new(&net_params)
        .wrap_err("Failed to initialise the PoseClient")?;
    info!("PoseClient initialised");

    let cmd_client = CmdClient::new(&net_params)
        .wrap_err("Failed to initialise the CmdClient")?;
    info!("CmdClient initialised");

    let tm_client = TmClient::new(&net_params)
        .wrap_err("Failed to initialise the TmClient")?;
    info!("TmClient initialised");

    info!("Network initialisation complete");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    loop {

        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // ---- DATA INPUT ----

        // Snapshot the latest pose. The feed thread swaps the full pose
        // under the lock, so this copy is always internally consistent.
        ds.robot_pose = pose_client.latest_pose();
        ds.traj_ctrl_input = traj_ctrl::InputData {
            pose: ds.robot_pose,
        };

        // ---- CONTROL ALGORITHM PROCESSING ----

        match ds.traj_ctrl.proc(&ds.traj_ctrl_input) {
            Ok((cmd, rpt)) => {
                ds.traj_ctrl_cmd = cmd;
                ds.traj_ctrl_status_rpt = rpt;
            },
            Err(e) => {
                // A proc error means the module state itself is unusable,
                // emit nothing this cycle rather than something stale.
                ds.traj_ctrl_cmd = None;
                warn!("Error during TrajCtrl processing: {}", e)
            }
        };

        // ---- COMMAND OUTPUT ----

        if let Some(cmd) = ds.traj_ctrl_cmd {
            match cmd_client.send(&cmd) {
                Ok(_) => {
                    ds.num_consec_cmd_send_errors = 0;
                },
                Err(e) => {
                    ds.num_consec_cmd_send_errors += 1;
                    warn!("Could not send velocity command: {}", e);
                }
            }
        }

        // ---- TELEMETRY ----

        // Best effort only, a telemetry failure must never affect control
        if let Some(ref pose) = ds.robot_pose {
            let packet = tm_client::packet_from_cycle(
                pose,
                &ds.traj_ctrl_status_rpt
            );

            match tm_client.send(&packet) {
                Ok(_) => (),
                Err(e) => warn!("TmClient error: {}", e)
            };
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(cycle_period_s)
            .checked_sub(cycle_dur)
        {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            },
            None => {
                // Overruns are absorbed as lateness, the cycle is never cut
                // short and no state is corrupted. A persistently slow
                // solver shows up here as a stream of warnings.
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period_s
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;
    }
}

/// Resolve a possibly-relative file path against the software root.
fn resolve_in_sw_root(file_path: &str) -> Result<PathBuf, Report> {
    let path = PathBuf::from(file_path);

    if path.is_absolute() {
        return Ok(path);
    }

    let mut resolved = host::get_sw_root()
        .map_err(|_| eyre!(
            "The software root environment variable ({}) is not set",
            host::SW_ROOT_ENV_VAR
        ))?;
    resolved.push(path);

    Ok(resolved)
}
