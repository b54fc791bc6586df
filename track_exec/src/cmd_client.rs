//! # Command client
//!
//! Sends velocity commands to the base, one datagram per control cycle.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::net::UdpSocket;

// Internal
use comms_if::{cmd::VelocityCmd, net::NetParams};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Client sending velocity commands to the base.
pub struct CmdClient {
    socket: UdpSocket,
    cmd_addr: String,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur in the command client.
#[derive(Debug, thiserror::Error)]
pub enum CmdClientError {
    #[error("Could not create the command socket: {0}")]
    SocketInitError(std::io::Error),

    #[error("Could not encode the command: {0}")]
    EncodeError(serde_json::Error),

    #[error("Could not send the command: {0}")]
    SendError(std::io::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CmdClient {
    /// Create a new command client.
    pub fn new(params: &NetParams) -> Result<Self, CmdClientError> {
        let socket = UdpSocket::bind("0.0.0.0:0")
            .map_err(CmdClientError::SocketInitError)?;

        Ok(Self {
            socket,
            cmd_addr: params.cmd_addr.clone(),
        })
    }

    /// Send a velocity command to the base.
    pub fn send(&self, cmd: &VelocityCmd) -> Result<(), CmdClientError> {
        let payload = serde_json::to_vec(cmd)
            .map_err(CmdClientError::EncodeError)?;

        self.socket
            .send_to(&payload, &self.cmd_addr)
            .map_err(CmdClientError::SendError)?;

        Ok(())
    }
}
