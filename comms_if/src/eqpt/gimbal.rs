//! # Gimbal Equipment Messages
//!
//! Wire formats for the messages exchanged with the gimbal: the periodic
//! feedback published by the gimbal and the rate command sent back to it.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Periodic measurement feedback published by the gimbal.
///
/// The gyro and accelerometer values are increments integrated over the
/// feedback period, not instantaneous rates. Joint angles are raw mechanical
/// angles, uncorrected for mounting offsets.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct GimbalFeedback {
    /// Message sequence id. Increments by one per message and wraps.
    pub id: u8,

    /// Delta angle about the gimbal x axis.
    ///
    /// Units: radians (integrated over the feedback period)
    pub gyro_x: f32,

    /// Delta angle about the gimbal y axis.
    ///
    /// Units: radians (integrated over the feedback period)
    pub gyro_y: f32,

    /// Delta angle about the gimbal z axis.
    ///
    /// Units: radians (integrated over the feedback period)
    pub gyro_z: f32,

    /// Delta velocity along the gimbal x axis.
    ///
    /// Units: meters/second (integrated over the feedback period)
    pub acc_x: f32,

    /// Delta velocity along the gimbal y axis.
    ///
    /// Units: meters/second (integrated over the feedback period)
    pub acc_y: f32,

    /// Delta velocity along the gimbal z axis.
    ///
    /// Units: meters/second (integrated over the feedback period)
    pub acc_z: f32,

    /// Roll joint angle.
    ///
    /// Units: radians
    pub joint_roll: f32,

    /// Elevation joint angle.
    ///
    /// Units: radians
    pub joint_el: f32,

    /// Azimuth joint angle.
    ///
    /// Units: radians
    pub joint_az: f32
}

/// Rate command sent to the gimbal's rate servos.
///
/// Fire-and-forget, one per feedback message. The feedback sequence id is
/// echoed so the gimbal can correlate command and measurement.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct GimbalControl {
    /// Id of the system the command is addressed to.
    pub target_system: u8,

    /// Id of the component the command is addressed to.
    pub target_component: u8,

    /// Sequence id of the feedback message this command was derived from.
    pub id: u8,

    /// Demanded angular rate about the gimbal x axis.
    ///
    /// Units: radians/second
    pub rate_x: f32,

    /// Demanded angular rate about the gimbal y axis.
    ///
    /// Units: radians/second
    pub rate_y: f32,

    /// Demanded angular rate about the gimbal z axis.
    ///
    /// Units: radians/second
    pub rate_z: f32
}
