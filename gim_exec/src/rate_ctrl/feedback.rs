//! Feedback decoding and integrity checking for RateCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use nalgebra::Vector3;

// Internal
use super::RateCtrl;
use comms_if::eqpt::gimbal::GimbalFeedback;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A validated measurement decoded from a single gimbal feedback message.
///
/// Only one measurement is kept, each feedback message overwrites the
/// previous one.
#[derive(Debug, Clone, Copy)]
pub struct Measurement {
    /// Sequence id of the feedback message this measurement was decoded from.
    pub id: u8,

    /// Rotation increments integrated over the feedback period.
    ///
    /// Units: radians
    pub delta_angles_rad: Vector3<f64>,

    /// Velocity increments integrated over the feedback period.
    ///
    /// Units: meters/second
    pub delta_velocity_ms: Vector3<f64>,

    /// Joint angles (roll, elevation, azimuth), corrected for the mounting
    /// offset calibration.
    ///
    /// Units: radians
    pub joint_angles_rad: Vector3<f64>
}

impl Default for Measurement {
    fn default() -> Self {
        Self {
            id: 0,
            delta_angles_rad: Vector3::zeros(),
            delta_velocity_ms: Vector3::zeros(),
            joint_angles_rad: Vector3::zeros()
        }
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RateCtrl {

    /// Decode a feedback message into the stored measurement.
    ///
    /// The sequence id is checked against the id expected from the previous
    /// message. A mismatch is not fatal: the error counter is incremented,
    /// the gap is flagged in the status report, and processing continues
    /// with the received data as authoritative.
    pub(crate) fn decode_feedback(&mut self, feedback: &GimbalFeedback) {
        // Sequence ids are u8 and wrap
        let expected_id = self.measurement.id.wrapping_add(1);

        if feedback.id != expected_id {
            self.feedback_error_count += 1;
            self.report.seq_gap = true;

            warn!(
                "Feedback sequence gap: expected id {}, got {} (error count: {})",
                expected_id, feedback.id, self.feedback_error_count
            );
        }

        self.measurement.id = feedback.id;

        self.measurement.delta_angles_rad = Vector3::new(
            feedback.gyro_x as f64,
            feedback.gyro_y as f64,
            feedback.gyro_z as f64
        );
        self.measurement.delta_velocity_ms = Vector3::new(
            feedback.acc_x as f64,
            feedback.acc_y as f64,
            feedback.acc_z as f64
        );
        self.measurement.joint_angles_rad = Vector3::new(
            feedback.joint_roll as f64,
            feedback.joint_el as f64,
            feedback.joint_az as f64
        );

        // Apply joint angle compensation
        self.measurement.joint_angles_rad -= Vector3::from(self.params.joint_offsets_rad);
    }
}
