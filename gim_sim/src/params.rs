//! Parameters structure for the gimbal simulator

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the gimbal simulator.
#[derive(Debug, Deserialize)]
pub struct GimSimParams {
    /// Period between published feedback messages.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Constant yaw rate the simulated vehicle turns at.
    ///
    /// Units: radians/second
    pub vehicle_yaw_rate_rads: f64,

    /// Joint angles the simulated gimbal starts at, in joint order (roll,
    /// elevation, azimuth).
    ///
    /// Units: radians
    pub initial_joint_angles_rad: [f64; 3],
}
