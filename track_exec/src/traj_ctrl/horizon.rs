//! # Horizon planning
//!
//! This module selects the look-ahead window of the reference path which is
//! handed to the solver each cycle: it derives the horizon length from the
//! path density, locates the nearest reference point under a combined
//! position/heading cost, classifies progress along the path, extracts the
//! window itself (wrapping cyclically), and removes the heading
//! discontinuities the solver cannot tolerate.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::params::{Params, PathEndPolicy};
use crate::loc::Pose2D;
use crate::ref_path::RefPath;
use util::maths::{unwrap_angles, wrap_to_pi};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The forward-looking window of reference poses given to the solver.
///
/// A horizon always holds exactly N+1 poses, where N is the derived horizon
/// length, and its heading column is unwrapped so consecutive headings
/// differ by at most pi. Horizons are recomputed every cycle and never
/// cached across cycles.
#[derive(Debug, Clone)]
pub struct Horizon {
    pub poses: Vec<Pose2D>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Progress along the reference path, derived fresh each cycle from the
/// nearest-point index.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PathProgress {
    /// The nearest point is comfortably inside the path.
    Tracking,

    /// The nearest point is within one horizon length of the path end. The
    /// end-of-path policy decides what this becomes.
    NearEnd,

    /// The path is complete and the robot must be commanded to a full stop.
    /// Only produced under the `stop` policy.
    Completed,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Derive the horizon length N from the number of points in the path.
///
/// Short paths get a fixed horizon, longer paths scale the horizon with the
/// path length so the solver always looks roughly the same time ahead
/// regardless of the path's point density.
///
/// Note that for very short paths this can yield N >= L. In that case the
/// cyclic indexing in [`extract_horizon`] is the only defence against
/// out-of-range access, which is intentional.
pub fn derive_horizon_len(path_len: usize, params: &Params) -> usize {
    if path_len < params.short_path_threshold {
        params.short_path_horizon_len
    }
    else {
        path_len / params.points_per_horizon_step
    }
}

/// Find the index of the path point nearest to the given pose.
///
/// The cost for each point is the euclidian distance to the pose plus the
/// weighted magnitude of the heading difference, with the heading
/// difference computed against the path's unwrapped heading column and
/// wrapped into (-pi, pi]. Ties break to the lowest index.
pub fn find_nearest_index(path: &RefPath, pose: &Pose2D, weight: f64) -> usize {
    let mut nearest_index = 0;
    let mut nearest_cost = std::f64::INFINITY;

    for i in 0..path.len() {
        let dist_m = pose.distance_to(path.at(i));
        let head_diff_rad = wrap_to_pi(
            path.unwrapped_heading(i) - pose.heading_rad
        ).abs();

        let cost = dist_m + weight * head_diff_rad;

        if cost < nearest_cost {
            nearest_cost = cost;
            nearest_index = i;
        }
    }

    nearest_index
}

/// Classify progress along the path from the raw nearest index.
///
/// The nearest index is near the end if fewer than one horizon length of
/// points remain ahead of it.
pub fn classify_progress(
    nearest_index: usize,
    path_len: usize,
    horizon_len: usize
) -> PathProgress {
    if nearest_index >= path_len.saturating_sub(horizon_len) {
        PathProgress::NearEnd
    }
    else {
        PathProgress::Tracking
    }
}

/// Apply the end-of-path policy to a raw (index, progress) pair, returning
/// the resolved horizon start index and final progress.
///
/// Under `repeat` the start is substituted with index 1 rather than 0, so
/// that the next cycle's nearest-point search does not re-select the point
/// just behind the robot and oscillate across the seam.
pub fn apply_end_policy(
    nearest_index: usize,
    progress: PathProgress,
    policy: PathEndPolicy
) -> (usize, PathProgress) {
    match (progress, policy) {
        (PathProgress::NearEnd, PathEndPolicy::Stop) => {
            (nearest_index, PathProgress::Completed)
        }
        (PathProgress::NearEnd, PathEndPolicy::Repeat) => {
            (1, PathProgress::Tracking)
        }
        _ => (nearest_index, progress)
    }
}

/// Extract the horizon of N+1 reference poses starting at the given index.
///
/// Indices beyond the end of the path wrap cyclically. After extraction the
/// heading column (and only the heading column) is unwrapped so consecutive
/// headings differ by at most pi, which the solver requires of its
/// reference.
pub fn extract_horizon(
    path: &RefPath,
    start_index: usize,
    horizon_len: usize
) -> Horizon {
    let mut poses = Vec::with_capacity(horizon_len + 1);

    for k in 0..=horizon_len {
        poses.push(*path.at(start_index + k));
    }

    let headings: Vec<f64> = poses.iter().map(|p| p.heading_rad).collect();
    for (pose, heading) in poses.iter_mut().zip(unwrap_angles(&headings)) {
        pose.heading_rad = heading;
    }

    Horizon { poses }
}

/// Unwrap the given pose's heading relative to the first pose of the
/// horizon.
///
/// If the raw heading difference to `horizon[0]` exceeds pi in magnitude
/// the heading is shifted by one full turn toward the reference, so the
/// solver is never asked to track a reference which appears to require
/// turning more than pi. The position passes through unchanged.
pub fn unwrap_pose_to_horizon(pose: &Pose2D, horizon: &Horizon) -> Pose2D {
    let mut unwrapped = *pose;

    if let Some(first) = horizon.poses.first() {
        let diff_rad = pose.heading_rad - first.heading_rad;

        if diff_rad.abs() > std::f64::consts::PI {
            if diff_rad > 0.0 {
                unwrapped.heading_rad -= 2.0 * std::f64::consts::PI;
            }
            else {
                unwrapped.heading_rad += 2.0 * std::f64::consts::PI;
            }
        }
    }

    unwrapped
}
