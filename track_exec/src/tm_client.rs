//! # Telemetry client
//!
//! Sends one diagnostic packet per control cycle to the external plotter.
//! Delivery is strictly best-effort: a failed send is logged by the caller
//! and never affects control.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::net::UdpSocket;

// Internal
use crate::loc::Pose2D;
use crate::traj_ctrl::StatusReport;
use comms_if::{net::NetParams, tm::TmPacket};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Client sending telemetry packets to the plotter.
pub struct TmClient {
    socket: UdpSocket,
    tm_addr: String,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur in the telemetry client.
#[derive(Debug, thiserror::Error)]
pub enum TmClientError {
    #[error("Could not create the telemetry socket: {0}")]
    SocketInitError(std::io::Error),

    #[error("Could not encode the telemetry packet: {0}")]
    EncodeError(serde_json::Error),

    #[error("Could not send the telemetry packet: {0}")]
    SendError(std::io::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TmClient {
    /// Create a new telemetry client.
    pub fn new(params: &NetParams) -> Result<Self, TmClientError> {
        let socket = UdpSocket::bind("0.0.0.0:0")
            .map_err(TmClientError::SocketInitError)?;

        Ok(Self {
            socket,
            tm_addr: params.tm_addr.clone(),
        })
    }

    /// Send a telemetry packet to the plotter.
    pub fn send(&self, packet: &TmPacket) -> Result<(), TmClientError> {
        let payload = serde_json::to_vec(packet)
            .map_err(TmClientError::EncodeError)?;

        self.socket
            .send_to(&payload, &self.tm_addr)
            .map_err(TmClientError::SendError)?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Build the telemetry packet for one control cycle from the robot pose and
/// the trajectory control status report.
pub fn packet_from_cycle(pose: &Pose2D, report: &StatusReport) -> TmPacket {
    let (nearest_x_m, nearest_y_m) = match report.nearest_point {
        Some(p) => (p.position_m[0], p.position_m[1]),
        None => (0.0, 0.0)
    };

    TmPacket {
        actual_x_m: pose.position_m[0],
        actual_y_m: pose.position_m[1],
        forecast_x_m: report.predicted_m.iter().map(|p| p[0]).collect(),
        forecast_y_m: report.predicted_m.iter().map(|p| p[1]).collect(),
        nearest_x_m,
        nearest_y_m,
        solve_time_s: report.solve_time_s,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::traj_ctrl::PathProgress;

    #[test]
    fn test_packet_from_cycle() {
        let pose = Pose2D::new(1.0, 2.0, 0.5);
        let report = StatusReport {
            nearest_index: Some(4),
            nearest_point: Some(Pose2D::new(1.1, 2.1, 0.5)),
            progress: Some(PathProgress::Tracking),
            solve_time_s: 0.003,
            solver_held: false,
            predicted_m: vec![[1.2, 2.2], [1.3, 2.3]],
        };

        let packet = packet_from_cycle(&pose, &report);

        assert_eq!(packet.actual_x_m, 1.0);
        assert_eq!(packet.actual_y_m, 2.0);
        assert_eq!(packet.forecast_x_m, vec![1.2, 1.3]);
        assert_eq!(packet.forecast_y_m, vec![2.2, 2.3]);
        assert_eq!(packet.nearest_x_m, 1.1);
        assert_eq!(packet.solve_time_s, 0.003);
    }
}
