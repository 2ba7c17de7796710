//! # Vehicle State Messages

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Vehicle attitude snapshot published by the vehicle's own attitude source.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct VehicleState {
    /// Vehicle yaw rate in the earth frame.
    ///
    /// Units: radians/second
    pub yaw_rate_earth_rads: f64,

    /// Vehicle orientation quaternion (body to earth), scalar first.
    pub quat_wxyz: [f64; 4]
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for VehicleState {
    fn default() -> Self {
        Self {
            yaw_rate_earth_rads: 0.0,
            quat_wxyz: [1.0, 0.0, 0.0, 0.0]
        }
    }
}
