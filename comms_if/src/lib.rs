//! # Communications interface crate.
//!
//! Provides the wire formats exchanged between the controller executable and
//! its external collaborators (the pose feed, the base command channel and
//! the telemetry plotter). All messages are JSON-encoded datagrams.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Velocity command messages sent to the base
pub mod cmd;

/// Network endpoint parameters
pub mod net;

/// Pose feed messages recieved from the localisation source
pub mod pose;

/// Telemetry packets sent to the plotter
pub mod tm;
