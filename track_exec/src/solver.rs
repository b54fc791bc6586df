//! # Horizon solver interface
//!
//! The solver converts a current state, a reference horizon and a reference
//! control sequence into one feasible control action plus its internally
//! predicted trajectory. This module defines that contract as a trait, so
//! the numeric optimisation behind it is swappable (and stubbable in
//! tests), together with [`UnicycleSolver`], a simple bounded kinematic
//! tracking implementation used as the default.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use comms_if::cmd::VelocityCmd;

// Internal
use crate::loc::Pose2D;
use crate::traj_ctrl::Horizon;
use util::maths::{clamp, wrap_to_pi};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Construction parameters common to all solvers.
#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    /// Linear velocity demand minimum limit
    pub min_lin_ms: f64,

    /// Linear velocity demand maximum limit
    pub max_lin_ms: f64,

    /// Angular velocity demand minimum limit
    pub min_ang_rads: f64,

    /// Angular velocity demand maximum limit
    pub max_ang_rads: f64,

    /// Horizon length N. Solvers recieve N+1 reference poses and N
    /// reference controls.
    pub horizon_len: usize,

    /// Period of one control cycle in seconds
    pub period_s: f64,
}

/// The result of one solve: the control action to execute now and the
/// trajectory the solver predicts the robot will follow under its planned
/// control sequence.
#[derive(Debug, Clone)]
pub struct Solution {
    pub cmd: VelocityCmd,
    pub predicted: Vec<Pose2D>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors a solver can raise for a single solve.
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    /// The reference data handed to the solver has the wrong length.
    #[error("Reference horizon has the wrong length: expected {expected}, found {found}")]
    WrongHorizonLen { expected: usize, found: usize },

    /// The solver could not produce a solution for this cycle.
    #[error("The solver failed to produce a solution: {0}")]
    SolveFailed(String),
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A solver for the local tracking problem posed each cycle.
///
/// Implementations must return a command within the configured velocity
/// bounds, and must be deterministic for a given input so that the loop can
/// be tested against them.
pub trait HorizonSolver: Send {
    /// Solve the tracking problem for one cycle.
    ///
    /// # Inputs
    /// - `current`: the current robot pose, heading already unwrapped
    ///   relative to the horizon
    /// - `horizon`: N+1 reference poses with a continuous heading column
    /// - `ref_controls`: N reference controls the solution should stay
    ///   close to
    fn solve(
        &mut self,
        current: &Pose2D,
        horizon: &Horizon,
        ref_controls: &[VelocityCmd]
    ) -> Result<Solution, SolverError>;
}

// ---------------------------------------------------------------------------
// DEFAULT SOLVER
// ---------------------------------------------------------------------------

/// A bounded kinematic tracking solver for differential-drive bases.
///
/// For each step of the horizon a proportional law steers toward the next
/// reference pose, blended toward the reference control to limit control
/// change, clamped to the configured bounds, and the unicycle model is
/// integrated one period forward to produce the predicted trajectory. The
/// first control of the planned sequence is returned for execution.
///
/// This is a feasibility-first implementation of the solver contract, it
/// makes no optimality claim.
pub struct UnicycleSolver {
    config: SolverConfig,

    /// Gain on the distance to the tracked reference point
    lin_gain: f64,

    /// Gain on the heading error to the tracked reference point
    head_gain: f64,

    /// Blend factor toward the reference control, in [0, 1]
    smoothing: f64,
}

impl UnicycleSolver {
    /// Create a new solver from its configuration and gains.
    pub fn new(
        config: SolverConfig,
        lin_gain: f64,
        head_gain: f64,
        smoothing: f64
    ) -> Self {
        Self {
            config,
            lin_gain,
            head_gain,
            smoothing,
        }
    }
}

impl HorizonSolver for UnicycleSolver {
    fn solve(
        &mut self,
        current: &Pose2D,
        horizon: &Horizon,
        ref_controls: &[VelocityCmd]
    ) -> Result<Solution, SolverError> {
        let n = self.config.horizon_len;

        if horizon.poses.len() != n + 1 {
            return Err(SolverError::WrongHorizonLen {
                expected: n + 1,
                found: horizon.poses.len(),
            });
        }

        let mut state = *current;
        let mut predicted = Vec::with_capacity(n);
        let mut first_cmd: Option<VelocityCmd> = None;

        for k in 0..n {
            let target = &horizon.poses[k + 1];
            let to_target = target.position_m - state.position_m;
            let dist_m = to_target.norm();

            // Steer toward the target point, or align with the reference
            // heading once on top of it
            let desired_heading_rad = if dist_m > 1e-6 {
                to_target[1].atan2(to_target[0])
            }
            else {
                target.heading_rad
            };
            let head_err_rad = wrap_to_pi(desired_heading_rad - state.heading_rad);

            // Proportional law. The cosine scales the forward speed down to
            // zero (or reverse) when the target is behind the robot
            let mut lin_ms = self.lin_gain * dist_m * head_err_rad.cos();
            let mut ang_rads = self.head_gain * head_err_rad;

            // Blend toward the reference control to limit control change
            if let Some(r) = ref_controls.get(k) {
                lin_ms = (1.0 - self.smoothing) * lin_ms + self.smoothing * r.lin_ms;
                ang_rads = (1.0 - self.smoothing) * ang_rads + self.smoothing * r.ang_rads;
            }

            let cmd = VelocityCmd {
                lin_ms: clamp(&lin_ms, &self.config.min_lin_ms, &self.config.max_lin_ms),
                ang_rads: clamp(&ang_rads, &self.config.min_ang_rads, &self.config.max_ang_rads),
            };

            // Integrate the unicycle model one period forward
            state.position_m[0] += cmd.lin_ms * state.heading_rad.cos() * self.config.period_s;
            state.position_m[1] += cmd.lin_ms * state.heading_rad.sin() * self.config.period_s;
            state.heading_rad += cmd.ang_rads * self.config.period_s;

            predicted.push(state);

            if first_cmd.is_none() {
                first_cmd = Some(cmd);
            }
        }

        Ok(Solution {
            cmd: first_cmd.unwrap_or_default(),
            predicted,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::traj_ctrl::Horizon;

    fn test_config(n: usize) -> SolverConfig {
        SolverConfig {
            min_lin_ms: -1.0,
            max_lin_ms: 1.0,
            min_ang_rads: -1.5,
            max_ang_rads: 1.5,
            horizon_len: n,
            period_s: 0.1,
        }
    }

    fn straight_horizon(n: usize) -> Horizon {
        Horizon {
            poses: (0..=n)
                .map(|k| Pose2D::new(k as f64 * 0.1, 0.0, 0.0))
                .collect(),
        }
    }

    #[test]
    fn test_solution_shape() {
        let n = 10;
        let mut solver = UnicycleSolver::new(test_config(n), 0.8, 1.2, 0.2);

        let current = Pose2D::new(0.0, 0.05, 0.0);
        let refs = vec![VelocityCmd::zero(); n];

        let solution = solver.solve(&current, &straight_horizon(n), &refs).unwrap();
        assert_eq!(solution.predicted.len(), n);
    }

    #[test]
    fn test_bounds_always_honoured() {
        // Absurd gains must still produce an in-bounds command
        let n = 5;
        let config = test_config(n);
        let mut solver = UnicycleSolver::new(config, 1e6, 1e6, 0.0);

        let current = Pose2D::new(-50.0, 30.0, 2.0);
        let refs = vec![VelocityCmd::zero(); n];

        let solution = solver.solve(&current, &straight_horizon(n), &refs).unwrap();
        assert!(solution.cmd.in_bounds(
            config.min_lin_ms,
            config.max_lin_ms,
            config.min_ang_rads,
            config.max_ang_rads
        ));
    }

    #[test]
    fn test_wrong_horizon_len_rejected() {
        let n = 10;
        let mut solver = UnicycleSolver::new(test_config(n), 0.8, 1.2, 0.2);

        let current = Pose2D::default();
        let refs = vec![VelocityCmd::zero(); n];

        match solver.solve(&current, &straight_horizon(4), &refs) {
            Err(SolverError::WrongHorizonLen { expected: 11, found: 5 }) => (),
            other => panic!("Expected WrongHorizonLen, got {:?}", other.map(|s| s.cmd))
        }
    }

    #[test]
    fn test_deterministic() {
        let n = 8;
        let mut solver = UnicycleSolver::new(test_config(n), 0.8, 1.2, 0.2);

        let current = Pose2D::new(0.3, -0.2, 0.4);
        let refs = vec![VelocityCmd { lin_ms: 0.5, ang_rads: 0.1 }; n];
        let horizon = straight_horizon(n);

        let a = solver.solve(&current, &horizon, &refs).unwrap();
        let b = solver.solve(&current, &horizon, &refs).unwrap();
        assert_eq!(a.cmd, b.cmd);
    }
}
