//! Implementations for the TrajCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};
use std::path::PathBuf;
use std::time::Instant;

// Internal
use super::horizon::{self, PathProgress};
use super::{Params, TrajCtrlError};
use crate::loc::Pose2D;
use crate::ref_path::RefPath;
use crate::solver::{HorizonSolver, SolverConfig, UnicycleSolver};
use comms_if::cmd::VelocityCmd;
use util::{module::State, params, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Trajectory control module state
#[derive(Default)]
pub struct TrajCtrl {
    pub(crate) params: Params,

    /// Executing mode
    mode: TrajCtrlMode,

    /// Derived horizon length N for the loaded path
    horizon_len: usize,

    /// The reference path being tracked
    ref_path: Option<RefPath>,

    /// The solver handling the local tracking problem
    solver: Option<Box<dyn HorizonSolver>>,

    /// The previous cycle's emitted command. Repeated N times it forms the
    /// reference control sequence handed to the solver, and it is the
    /// command held when a solve fails.
    prev_cmd: VelocityCmd,

    input_pose: Option<Pose2D>,
    output_cmd: Option<VelocityCmd>,
    report: StatusReport,
}

/// Data required to initialise TrajCtrl.
pub struct InitData {
    /// Name of the module's parameter file
    pub params_file: &'static str,

    /// Path to the reference trajectory CSV file
    pub trajectory_path: PathBuf,

    /// Period of one control cycle in seconds
    pub cycle_period_s: f64,
}

/// Input data to trajectory control.
#[derive(Default)]
pub struct InputData {
    /// Snapshot of the latest robot pose, or `None` if no valid pose has
    /// been recieved yet.
    pub pose: Option<Pose2D>,
}

/// The status report containing monitoring quantities for one cycle.
#[derive(Clone, Debug, Default)]
pub struct StatusReport {
    /// The resolved horizon start index (after the end-of-path policy has
    /// been applied), if the module tracked this cycle
    pub nearest_index: Option<usize>,

    /// The reference point at the resolved index
    pub nearest_point: Option<Pose2D>,

    /// Progress along the path this cycle
    pub progress: Option<PathProgress>,

    /// Time taken by the solver this cycle in seconds
    pub solve_time_s: f64,

    /// True if the solver failed this cycle and the previous command was
    /// held instead
    pub solver_held: bool,

    /// Positions of the solver's predicted trajectory in meters
    pub predicted_m: Vec<[f64; 2]>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The possible modes of execution of TrajCtrl. Each mode is handled by a
/// `mode_xyz` function.
///
/// `Stopped` is terminal: once the end of the path has been reached under
/// the `stop` policy the module commands a full stop on every subsequent
/// cycle, even if nearest-point noise later yields a non-terminal index.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TrajCtrlMode {
    WaitingForState,
    Tracking,
    Stopped,
}

impl Default for TrajCtrlMode {
    fn default() -> Self {
        TrajCtrlMode::WaitingForState
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for TrajCtrl {
    type InitData = InitData;
    type InitError = TrajCtrlError;

    type InputData = InputData;
    type OutputData = Option<VelocityCmd>;
    type StatusReport = StatusReport;
    type ProcError = TrajCtrlError;

    /// Initialise the TrajCtrl module.
    ///
    /// Loads the module parameters and the reference path, derives the
    /// horizon length and constructs the solver. Any data error here is
    /// fatal, a controller without a valid path has nothing to do.
    fn init(&mut self, init_data: Self::InitData, _session: &Session)
        -> Result<(), Self::InitError>
    {
        // Load the parameters
        self.params = params::load(init_data.params_file)
            .map_err(TrajCtrlError::ParamLoadError)?;

        // Load the reference path
        let path = RefPath::load(&init_data.trajectory_path)
            .map_err(TrajCtrlError::PathLoadError)?;

        self.horizon_len = horizon::derive_horizon_len(path.len(), &self.params);

        info!(
            "Reference path loaded: {} points, horizon length {}, end policy {:?}",
            path.len(),
            self.horizon_len,
            self.params.end_policy
        );

        if self.horizon_len >= path.len() {
            warn!(
                "Horizon length {} is not shorter than the path ({} points), \
                 every extracted horizon will wrap the full path",
                self.horizon_len,
                path.len()
            );
        }

        // Initialise the solver
        self.solver = Some(Box::new(UnicycleSolver::new(
            SolverConfig {
                min_lin_ms: self.params.min_lin_ms,
                max_lin_ms: self.params.max_lin_ms,
                min_ang_rads: self.params.min_ang_rads,
                max_ang_rads: self.params.max_ang_rads,
                horizon_len: self.horizon_len,
                period_s: init_data.cycle_period_s,
            },
            self.params.lin_gain,
            self.params.head_gain,
            self.params.control_smoothing,
        )));

        self.ref_path = Some(path);
        self.mode = TrajCtrlMode::WaitingForState;

        Ok(())
    }

    /// Perform cyclic processing of trajectory control.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        // Setup cycle data
        self.input_pose = input_data.pose;
        self.output_cmd = None;
        self.report = StatusReport::default();

        // Mode execution. Each of the mode functions either fills in the
        // output command or returns an error
        match self.mode {
            TrajCtrlMode::WaitingForState => self.mode_waiting(),
            TrajCtrlMode::Tracking => self.mode_tracking(),
            TrajCtrlMode::Stopped => self.mode_stopped(),
        }?;

        Ok((self.output_cmd, self.report.clone()))
    }
}

impl TrajCtrl {

    /// Mode waiting for state.
    ///
    /// No command is emitted until the first valid pose arrives. Once it
    /// does the module switches to tracking and processes the same cycle.
    fn mode_waiting(&mut self) -> Result<(), TrajCtrlError> {
        match self.input_pose {
            Some(_) => {
                info!("First valid pose recieved, tracking started");
                self.mode = TrajCtrlMode::Tracking;
                self.mode_tracking()
            }
            None => {
                info!("Waiting for initial pose data...");
                Ok(())
            }
        }
    }

    /// Mode tracking.
    ///
    /// The per-cycle tracking procedure: nearest-point search, end-of-path
    /// policy, horizon extraction, state unwrapping, solve and command
    /// selection.
    fn mode_tracking(&mut self) -> Result<(), TrajCtrlError> {
        // Validate pose
        let pose = match self.input_pose {
            Some(p) => p,
            None => return Err(TrajCtrlError::NoPose)
        };

        // ---- NEAREST POINT & PROGRESS ----

        let (start_index, progress, nearest_point, hz) = {
            // Validate path
            let path = match self.ref_path {
                Some(ref p) => p,
                None => return Err(TrajCtrlError::NoPath)
            };

            let nearest = horizon::find_nearest_index(
                path, &pose, self.params.nearest_weight
            );
            let raw_progress = horizon::classify_progress(
                nearest, path.len(), self.horizon_len
            );
            let (start_index, progress) = horizon::apply_end_policy(
                nearest, raw_progress, self.params.end_policy
            );

            (
                start_index,
                progress,
                *path.at(start_index),
                horizon::extract_horizon(path, start_index, self.horizon_len),
            )
        };

        self.report.nearest_index = Some(start_index);
        self.report.nearest_point = Some(nearest_point);
        self.report.progress = Some(progress);

        if progress == PathProgress::Completed {
            info!("Nearest point is within one horizon of the path end, stopping");
            self.mode = TrajCtrlMode::Stopped;
            return self.mode_stopped();
        }

        // ---- SOLVE ----

        // The reference control sequence repeats the previous command,
        // asking the solver to minimise control change rather than track a
        // precomputed control trajectory
        let ref_controls = vec![self.prev_cmd; self.horizon_len];

        let unwrapped_pose = horizon::unwrap_pose_to_horizon(&pose, &hz);

        let solve_start = Instant::now();
        let result = match self.solver {
            Some(ref mut s) => s.solve(&unwrapped_pose, &hz, &ref_controls),
            None => return Err(TrajCtrlError::NoSolver)
        };
        self.report.solve_time_s = solve_start.elapsed().as_secs_f64();

        // ---- COMMAND SELECTION ----

        // A failed solve, or a solve violating the bounds contract,
        // degrades this cycle to holding the previous command rather than
        // crashing the loop or emitting an erratic command
        let cmd = match result {
            Ok(solution) => {
                if solution.cmd.in_bounds(
                    self.params.min_lin_ms,
                    self.params.max_lin_ms,
                    self.params.min_ang_rads,
                    self.params.max_ang_rads,
                ) {
                    self.report.predicted_m = solution.predicted
                        .iter()
                        .map(|p| [p.position_m[0], p.position_m[1]])
                        .collect();
                    solution.cmd
                }
                else {
                    warn!(
                        "Solver returned an out of bounds command {:?}, \
                         holding previous command",
                        solution.cmd
                    );
                    self.report.solver_held = true;
                    self.prev_cmd
                }
            }
            Err(e) => {
                warn!("Solver failed ({}), holding previous command", e);
                self.report.solver_held = true;
                self.prev_cmd
            }
        };

        self.prev_cmd = cmd;
        self.output_cmd = Some(cmd);

        Ok(())
    }

    /// Mode stopped.
    ///
    /// A full stop is commanded on every cycle. This mode is never left.
    fn mode_stopped(&mut self) -> Result<(), TrajCtrlError> {
        let cmd = VelocityCmd::zero();

        self.prev_cmd = cmd;
        self.output_cmd = Some(cmd);
        self.report.progress = Some(PathProgress::Completed);

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::solver::{Solution, SolverError};
    use crate::traj_ctrl::{Horizon, PathEndPolicy};

    /// A solver stub returning a fixed command, optionally failing, and
    /// optionally checking the horizon length it is handed.
    struct StubSolver {
        cmd: VelocityCmd,
        fail: bool,
        expect_horizon_len: Option<usize>,
    }

    impl HorizonSolver for StubSolver {
        fn solve(
            &mut self,
            _current: &Pose2D,
            horizon: &Horizon,
            _ref_controls: &[VelocityCmd]
        ) -> Result<Solution, SolverError> {
            if let Some(expected) = self.expect_horizon_len {
                assert_eq!(horizon.poses.len(), expected);
            }

            if self.fail {
                Err(SolverError::SolveFailed("stub failure".into()))
            }
            else {
                Ok(Solution {
                    cmd: self.cmd,
                    predicted: vec![],
                })
            }
        }
    }

    fn stub(lin_ms: f64, ang_rads: f64) -> StubSolver {
        StubSolver {
            cmd: VelocityCmd { lin_ms, ang_rads },
            fail: false,
            expect_horizon_len: None,
        }
    }

    /// Build a ready-to-proc TrajCtrl without going through file loading
    fn test_ctrl(
        policy: PathEndPolicy,
        poses: Vec<Pose2D>,
        horizon_len: usize,
        solver: StubSolver
    ) -> TrajCtrl {
        let mut ctrl = TrajCtrl::default();

        ctrl.params = Params {
            end_policy: policy,
            nearest_weight: 0.2,
            short_path_threshold: 500,
            short_path_horizon_len: 10,
            points_per_horizon_step: 50,
            min_lin_ms: -1.0,
            max_lin_ms: 1.0,
            min_ang_rads: -1.5,
            max_ang_rads: 1.5,
            ..Default::default()
        };
        ctrl.ref_path = Some(RefPath::from_poses(poses).unwrap());
        ctrl.horizon_len = horizon_len;
        ctrl.solver = Some(Box::new(solver));
        ctrl.mode = TrajCtrlMode::WaitingForState;

        ctrl
    }

    fn three_point_path() -> Vec<Pose2D> {
        vec![
            Pose2D::new(0.0, 0.0, 0.0),
            Pose2D::new(1.0, 0.0, 0.0),
            Pose2D::new(2.0, 0.0, 0.0),
        ]
    }

    fn long_straight_path() -> Vec<Pose2D> {
        (0..30).map(|i| Pose2D::new(i as f64, 0.0, 0.0)).collect()
    }

    #[test]
    fn test_waiting_without_pose() {
        let mut ctrl = test_ctrl(
            PathEndPolicy::Stop, three_point_path(), 10, stub(0.5, 0.0)
        );

        // No valid pose ever arrives: the module idles forever, emitting
        // nothing and never erroring
        for _ in 0..5 {
            let (cmd, rpt) = ctrl.proc(&InputData { pose: None }).unwrap();
            assert_eq!(cmd, None);
            assert!(rpt.nearest_index.is_none());
        }

        assert_eq!(ctrl.mode, TrajCtrlMode::WaitingForState);
    }

    #[test]
    fn test_first_pose_starts_tracking_same_cycle() {
        let mut ctrl = test_ctrl(
            PathEndPolicy::Repeat, three_point_path(), 10, stub(0.5, 0.0)
        );

        let (cmd, _) = ctrl.proc(&InputData { pose: None }).unwrap();
        assert_eq!(cmd, None);

        let (cmd, _) = ctrl.proc(&InputData {
            pose: Some(Pose2D::new(0.1, 0.0, 0.0))
        }).unwrap();
        assert!(cmd.is_some());
        assert_eq!(ctrl.mode, TrajCtrlMode::Tracking);
    }

    #[test]
    fn test_end_to_end_repeat_scenario() {
        // Three point path, pose near the middle point, forced N = 10 so
        // the whole path is "near the end" and the horizon wraps the path
        // several times
        let mut ctrl = test_ctrl(
            PathEndPolicy::Repeat,
            three_point_path(),
            10,
            StubSolver {
                cmd: VelocityCmd { lin_ms: 0.5, ang_rads: 0.0 },
                fail: false,
                expect_horizon_len: Some(11),
            }
        );

        let input = InputData { pose: Some(Pose2D::new(0.9, 0.0, 0.0)) };
        let (cmd, rpt) = ctrl.proc(&input).unwrap();

        // The seam substitution resolves the start index to 1 and keeps
        // tracking, and the emitted command is the solver output unchanged
        assert_eq!(cmd, Some(VelocityCmd { lin_ms: 0.5, ang_rads: 0.0 }));
        assert_eq!(rpt.nearest_index, Some(1));
        assert_eq!(rpt.progress, Some(PathProgress::Tracking));
        assert_eq!(ctrl.mode, TrajCtrlMode::Tracking);
    }

    #[test]
    fn test_repeat_seam_no_thrash() {
        let mut ctrl = test_ctrl(
            PathEndPolicy::Repeat, three_point_path(), 10, stub(0.5, 0.0)
        );

        // Robot sat at the tail of the loop: two consecutive cycles must
        // resolve the same start index, not oscillate across the seam
        let input = InputData { pose: Some(Pose2D::new(2.0, 0.0, 0.0)) };

        let (_, rpt_a) = ctrl.proc(&input).unwrap();
        let (_, rpt_b) = ctrl.proc(&input).unwrap();

        assert_eq!(rpt_a.nearest_index, Some(1));
        assert_eq!(rpt_b.nearest_index, Some(1));
        assert_eq!(rpt_a.progress, Some(PathProgress::Tracking));
        assert_eq!(rpt_b.progress, Some(PathProgress::Tracking));
    }

    #[test]
    fn test_sticky_stop() {
        let mut ctrl = test_ctrl(
            PathEndPolicy::Stop, long_straight_path(), 5, stub(0.5, 0.0)
        );

        // Robot at the tail: index 29 >= 30 - 5, path completes
        let (cmd, rpt) = ctrl.proc(&InputData {
            pose: Some(Pose2D::new(29.0, 0.0, 0.0))
        }).unwrap();

        assert_eq!(cmd, Some(VelocityCmd::zero()));
        assert_eq!(rpt.progress, Some(PathProgress::Completed));
        assert_eq!(ctrl.mode, TrajCtrlMode::Stopped);

        // Nearest-point noise teleports the pose back to the middle of the
        // path: the stop must stick and the command stay zero
        for _ in 0..3 {
            let (cmd, rpt) = ctrl.proc(&InputData {
                pose: Some(Pose2D::new(2.0, 0.0, 0.0))
            }).unwrap();

            assert_eq!(cmd, Some(VelocityCmd::zero()));
            assert_eq!(rpt.progress, Some(PathProgress::Completed));
            assert_eq!(ctrl.mode, TrajCtrlMode::Stopped);
        }
    }

    #[test]
    fn test_repeat_policy_never_stops() {
        let mut ctrl = test_ctrl(
            PathEndPolicy::Repeat, long_straight_path(), 5, stub(0.5, 0.0)
        );

        let (cmd, _) = ctrl.proc(&InputData {
            pose: Some(Pose2D::new(29.0, 0.0, 0.0))
        }).unwrap();

        assert_eq!(cmd, Some(VelocityCmd { lin_ms: 0.5, ang_rads: 0.0 }));
        assert_eq!(ctrl.mode, TrajCtrlMode::Tracking);
    }

    #[test]
    fn test_solver_failure_holds_previous_command() {
        let mut ctrl = test_ctrl(
            PathEndPolicy::Stop,
            long_straight_path(),
            5,
            StubSolver {
                cmd: VelocityCmd::zero(),
                fail: true,
                expect_horizon_len: None,
            }
        );
        ctrl.prev_cmd = VelocityCmd { lin_ms: 0.3, ang_rads: 0.1 };

        let (cmd, rpt) = ctrl.proc(&InputData {
            pose: Some(Pose2D::new(2.0, 0.0, 0.0))
        }).unwrap();

        assert_eq!(cmd, Some(VelocityCmd { lin_ms: 0.3, ang_rads: 0.1 }));
        assert!(rpt.solver_held);
        assert_eq!(ctrl.mode, TrajCtrlMode::Tracking);

        // The failure is contained to the cycle: a later good solve is
        // emitted as normal
        ctrl.solver = Some(Box::new(stub(0.4, 0.0)));
        let (cmd, rpt) = ctrl.proc(&InputData {
            pose: Some(Pose2D::new(2.0, 0.0, 0.0))
        }).unwrap();

        assert_eq!(cmd, Some(VelocityCmd { lin_ms: 0.4, ang_rads: 0.0 }));
        assert!(!rpt.solver_held);
    }

    #[test]
    fn test_out_of_bounds_solution_held() {
        let mut ctrl = test_ctrl(
            PathEndPolicy::Stop, long_straight_path(), 5, stub(5.0, 0.0)
        );
        ctrl.prev_cmd = VelocityCmd { lin_ms: 0.2, ang_rads: 0.0 };

        // The stub's 5.0 m/s violates the 1.0 m/s bound: the solver has
        // broken its contract and the previous command is held
        let (cmd, rpt) = ctrl.proc(&InputData {
            pose: Some(Pose2D::new(2.0, 0.0, 0.0))
        }).unwrap();

        assert_eq!(cmd, Some(VelocityCmd { lin_ms: 0.2, ang_rads: 0.0 }));
        assert!(rpt.solver_held);
    }
}
