//! Parameters structure for RateCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Rate control.
#[derive(Debug, Default, Deserialize)]
pub struct Params {

    // ---- TIMING ----

    /// Period between gimbal feedback messages. One control cycle runs per
    /// message, so this is also the control period.
    ///
    /// Units: seconds
    pub delta_time_s: f64,

    // ---- GAINS ----

    /// Proportional gain applied to both the yaw centring and tilt tracking
    /// terms.
    ///
    /// Units: 1/second
    pub k_gimbal_rate: f64,

    /// Maximum permitted steady state yaw joint angle error. Together with
    /// `k_gimbal_rate` this sets the vehicle turn rate above which the
    /// excess rate correction is applied.
    ///
    /// Units: radians
    pub yaw_error_limit_rad: f64,

    /// Pole of the single-pole low-pass filter applied to the vehicle's
    /// earth frame yaw rate.
    ///
    /// Units: radians/second
    pub yaw_rate_filt_pole: f64,

    // ---- TILT TARGET ----

    /// Maximum rate at which the tilt angle target may change.
    ///
    /// Units: radians/second
    pub max_tilt_rate_rads: f64,

    /// Minimum tilt angle, mapped from a normalised demand of -1.
    ///
    /// Units: radians
    pub tilt_angle_min_rad: f64,

    /// Maximum tilt angle, mapped from a normalised demand of +1.
    ///
    /// Units: radians
    pub tilt_angle_max_rad: f64,

    // ---- CALIBRATION ----

    /// Offsets subtracted from the raw joint angles to correct mechanical
    /// misalignment, in joint order (roll, elevation, azimuth).
    ///
    /// Units: radians
    pub joint_offsets_rad: [f64; 3],

    // ---- ADDRESSING ----

    /// Id of the system outgoing rate commands are addressed to.
    pub target_system: u8,

    /// Id of the component outgoing rate commands are addressed to.
    pub target_component: u8
}
