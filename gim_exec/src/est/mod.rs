//! # Attitude estimator interface
//!
//! The attitude and gyro-bias estimator is an external collaborator of the
//! rate control module: RateCtrl feeds it the decoded measurements and reads
//! back the orientation estimate each cycle, but its internal filter is not
//! part of this software. The [`AttitudeEstimator`] trait captures exactly
//! that boundary, allowing the full filter, the simple
//! [`DeltaIntegrator`], or a scripted test double to be injected.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod delta_integrator;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{UnitQuaternion, Vector3};

// Internal
pub use delta_integrator::DeltaIntegrator;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Interface to the gimbal attitude and gyro-bias estimator.
pub trait AttitudeEstimator {
    /// Feed one measurement period into the estimator.
    ///
    /// # Inputs
    /// - `dt_s`: the measurement period in seconds
    /// - `delta_angles_rad`: rotation increments over the period
    /// - `delta_velocity_ms`: velocity increments over the period
    /// - `joint_angles_rad`: offset-corrected joint angles
    fn update(
        &mut self,
        dt_s: f64,
        delta_angles_rad: &Vector3<f64>,
        delta_velocity_ms: &Vector3<f64>,
        joint_angles_rad: &Vector3<f64>
    );

    /// Get the current gimbal orientation estimate (gimbal to earth).
    fn orientation(&self) -> UnitQuaternion<f64>;

    /// Get the current gyro bias estimate in radians/second.
    fn gyro_bias_rads(&self) -> Vector3<f64>;

    /// True once the estimator has converged enough for its outputs to be
    /// used for control.
    fn is_ready(&self) -> bool;
}
