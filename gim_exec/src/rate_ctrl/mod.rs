//! # Rate control module
//!
//! Rate control is responsible for keeping the camera gimbal pointed at the
//! demanded orientation while the vehicle moves underneath it. Each feedback
//! message received from the gimbal triggers one control cycle:
//!
//! 1. The tilt angle target is updated from the latest operator demand,
//!    limited to the maximum tilt rate.
//! 2. The feedback message is decoded, its sequence id checked, and the
//!    joint angles corrected for mounting offsets.
//! 3. The measurement is fed to the attitude estimator, and the estimated
//!    orientation and gyro bias are combined with the joint angles and the
//!    vehicle's turn rate into a single rate demand vector. The demand is the
//!    sum of three terms: a proportional yaw-centring term (with a correction
//!    for vehicle turn rates the proportional gain alone cannot null out), a
//!    proportional tilt tracking term derived from the quaternion error, and
//!    a feed-forward term derived from the one-step change of the demanded
//!    orientation.
//! 4. If the estimator reports itself ready, a rate command echoing the
//!    feedback sequence id is built for dispatch to the gimbal.
//!
//! The yaw joint is never commanded directly: it is slaved to the vehicle's
//! heading, and the demanded quaternion always carries the estimated yaw.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod composer;
mod feedback;
mod frames;
mod params;
mod state;
mod target;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use feedback::*;
pub use frames::*;
pub use params::*;
pub use state::*;
pub use target::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during RateCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum RateCtrlError {
    #[error("Processing requested before the module was initialised")]
    NotInitialised,

    #[error("Composed rate demand is not finite: {0:?} (bad sensor data upstream?)")]
    NonFiniteRateDem([f64; 3]),
}
