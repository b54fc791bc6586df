//! # Pose Feed Messages

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single pose update from the localisation source.
///
/// The legacy feed signals "no data yet" by sending a pose at exactly the
/// origin, so recievers must treat (0, 0) as a sentinel rather than a real
/// position (see [`PoseMsg::is_origin_sentinel`]).
#[derive(Serialize, Deserialize, Debug, Copy, Clone)]
pub struct PoseMsg {
    /// Position along the world X axis in meters
    pub x_m: f64,

    /// Position along the world Y axis in meters
    pub y_m: f64,

    /// Heading (angle to the world +X axis) in radians
    pub heading_rad: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur while parsing a pose message.
#[derive(Debug, Error)]
pub enum PoseMsgError {
    #[error("Could not parse the pose message: {0}")]
    ParseError(serde_json::Error),
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl PoseMsg {
    /// Parse a pose message from a raw JSON datagram payload.
    pub fn from_json_slice(payload: &[u8]) -> Result<Self, PoseMsgError> {
        serde_json::from_slice(payload).map_err(PoseMsgError::ParseError)
    }

    /// True if this message carries the legacy feed's "no data yet" sentinel.
    pub fn is_origin_sentinel(&self) -> bool {
        self.x_m == 0.0 && self.y_m == 0.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse() {
        let msg = PoseMsg::from_json_slice(
            br#"{"x_m": 1.5, "y_m": -0.25, "heading_rad": 0.78}"#
        ).unwrap();

        assert_eq!(msg.x_m, 1.5);
        assert_eq!(msg.y_m, -0.25);
        assert_eq!(msg.heading_rad, 0.78);
        assert!(!msg.is_origin_sentinel());

        assert!(PoseMsg::from_json_slice(b"not json").is_err());
    }

    #[test]
    fn test_origin_sentinel() {
        let msg = PoseMsg::from_json_slice(
            br#"{"x_m": 0.0, "y_m": 0.0, "heading_rad": 1.0}"#
        ).unwrap();

        assert!(msg.is_origin_sentinel());
    }
}
