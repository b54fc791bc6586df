//! # Pose feed client
//!
//! Recieves pose updates from the external localisation source and exposes
//! the most recent one as an atomically-snapshotted value. The feed arrives
//! at its own rate on a background thread, the control loop reads a copy of
//! the latest pose once per cycle, so a cycle can never observe a partially
//! updated pose.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};
use std::net::UdpSocket;
use std::sync::{Arc, Mutex};
use std::thread;

// Internal
use crate::loc::Pose2D;
use comms_if::{net::NetParams, pose::PoseMsg};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Client recieving the external pose feed.
pub struct PoseClient {
    /// Latest valid pose, `None` until the first one arrives
    latest: Arc<Mutex<Option<Pose2D>>>,

    _rx_handle: thread::JoinHandle<()>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while setting up the pose feed client.
#[derive(Debug, thiserror::Error)]
pub enum PoseClientError {
    #[error("Could not bind the pose feed socket: {0}")]
    BindError(std::io::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PoseClient {
    /// Create a new pose feed client, spawning the reciever thread.
    pub fn new(params: &NetParams) -> Result<Self, PoseClientError> {
        let socket = UdpSocket::bind(&params.pose_bind_addr)
            .map_err(PoseClientError::BindError)?;

        let latest = Arc::new(Mutex::new(None));

        let latest_writer = Arc::clone(&latest);
        let rx_handle = thread::spawn(move || rx_thread(socket, latest_writer));

        Ok(Self {
            latest,
            _rx_handle: rx_handle,
        })
    }

    /// Get a snapshot of the latest valid pose.
    ///
    /// Returns `None` until the feed has delivered at least one valid pose.
    pub fn latest_pose(&self) -> Option<Pose2D> {
        match self.latest.lock() {
            Ok(p) => *p,
            Err(_) => {
                warn!("Pose snapshot lock is poisoned, treating pose as unavailable");
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Reciever thread: drain datagrams into the shared snapshot.
fn rx_thread(socket: UdpSocket, latest: Arc<Mutex<Option<Pose2D>>>) {
    let mut buf = [0u8; 512];

    loop {
        let len = match socket.recv(&mut buf) {
            Ok(l) => l,
            Err(e) => {
                warn!("Pose feed recieve error: {}", e);
                continue;
            }
        };

        let msg = match PoseMsg::from_json_slice(&buf[..len]) {
            Ok(m) => m,
            Err(e) => {
                warn!("Discarding malformed pose datagram: {}", e);
                continue;
            }
        };

        // The legacy feed sends the exact origin until localisation has
        // locked on, so such messages carry no data
        if msg.is_origin_sentinel() {
            debug!("Discarding origin-sentinel pose datagram");
            continue;
        }

        let pose = Pose2D::new(msg.x_m, msg.y_m, msg.heading_rad);

        // The full pose is swapped under the lock in one go
        if let Ok(mut latest) = latest.lock() {
            *latest = Some(pose);
        }
    }
}
