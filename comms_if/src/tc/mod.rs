//! # Telecommand module
//!
//! This module defines the telecommands accepted by the gimbal control
//! executable, and the responses returned to the operator station.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand, i.e. an instruction sent to the gimbal control executable
/// by the operator station.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub enum GimbalTc {
    /// Set the tilt angle demand.
    ///
    /// The demand is normalised into [-1, +1] by the operator station's own
    /// input decoding, and is mapped into the configured tilt angle range by
    /// the control executable. Values outside [-1, +1] are clamped.
    TiltDemand {
        /// Normalised tilt demand, -1 maps to the minimum tilt angle and +1
        /// to the maximum.
        dem_norm: f64
    },

    /// Put the executable into safe mode, suppressing all outgoing rate
    /// commands.
    MakeSafe,

    /// Take the executable out of safe mode.
    MakeUnsafe
}

/// Response to a telecommand.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub enum TcResponse {
    /// The TC was accepted and executed.
    Ok,

    /// The TC was valid but cannot be executed in the current state.
    CannotExecute,

    /// The TC could not be parsed.
    Invalid
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GimbalTc {
    /// Parse a new TC from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        serde_json::from_str(json_str).map_err(TcParseError::InvalidJson)
    }

    /// Serialise this TC into a JSON packet
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_tc_json_round_trip() {
        let tc = GimbalTc::TiltDemand { dem_norm: -0.25 };
        let json = tc.to_json().unwrap();

        match GimbalTc::from_json(&json).unwrap() {
            GimbalTc::TiltDemand { dem_norm } => assert_eq!(dem_norm, -0.25),
            other => panic!("Unexpected TC: {:?}", other)
        }
    }

    #[test]
    fn test_tc_invalid_json() {
        assert!(GimbalTc::from_json("not json").is_err());
    }
}
